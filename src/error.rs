use std::io;
use thiserror::Error;

use crate::processing::statistics::StatKind;

/// Problems with caller-supplied settings. Raised before any capture is read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Threshold is required")]
    MissingThreshold,

    #[error("Please enter a valid number for the threshold (got {0:?})")]
    InvalidThreshold(String),

    #[error("Unknown statistic {0:?} (expected one of mean, stdev, min, max, median, mode)")]
    UnknownStat(String),

    #[error("No statistics requested")]
    NoStats,

    #[error("Cannot read config file {path}: {reason}")]
    Config { path: String, reason: String },
}

/// Failures while turning a capture file into a waveform.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read file: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("Cannot parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot read workbook: {0}")]
    Workbook(String),

    #[error("No data found after header detection")]
    NoData,

    #[error("No {role} column found (looked for {wanted:?}, have {available:?})")]
    MissingColumn {
        role: &'static str,
        wanted: String,
        available: Vec<String>,
    },

    #[error("Row {row}: cannot parse time value {value:?}")]
    BadTime { row: usize, value: String },

    #[error("Row {row}: time {time} s does not increase past previous {previous} s")]
    NonIncreasingTime { row: usize, previous: f64, time: f64 },

    #[error("Row {row}: channel value {value:?} is not 0 or 1")]
    NonBinaryLevel { row: usize, value: String },

    #[error("Time column has {times} values but channel column has {levels}")]
    LengthMismatch { times: usize, levels: usize },
}

/// Statistic-level failures. These stay inside a report entry and never abort a run,
/// except `EmptyInput` which callers turn into an empty summary.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum StatsError {
    #[error("no data points")]
    EmptyInput,

    #[error("{kind} requires at least {required} data points, got {got}")]
    InsufficientData {
        kind: StatKind,
        required: usize,
        got: usize,
    },
}

/// Anything that stops a single analysis run.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

pub type LoadResult<T> = Result<T, LoadError>;
