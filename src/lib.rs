//! Timing analysis of an instrumented function from a logic-analyzer capture.
//!
//! Every call of the instrumented function toggles a digital line four times. The
//! pipeline finds the rising edges, groups them into calls of four, derives
//! the full (edge 1 to 4) and specific (edge 2 to 3) period of each call in
//! microseconds, and summarizes both distributions, optionally restricted to
//! calls at or above a threshold.
//!
//! ```no_run
//! use probetiming::{analyze, AnalysisConfig, WaveformSeries};
//!
//! let series = WaveformSeries::from_samples("ch0", &[(0.0, 0), (1e-6, 1)]).unwrap();
//! let report = analyze(&series, &AnalysisConfig::new(100.0));
//! println!("{report}");
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod processing;
pub mod report;
pub mod state;

pub use config::{parse_stats, parse_threshold, AnalysisConfig, ConfigFile};
pub use error::{AppError, LoadError, StatsError, ValidationError};
pub use processing::statistics::{ModeResult, StatKind, StatResult, StatValue};
pub use report::{analyze, AnalysisReport, SeriesSummary};
pub use state::waveform::{Sample, WaveformSeries};

use std::path::Path;

/// Load a capture file and run the pipeline over it.
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Result<AnalysisReport, AppError> {
    config.validate()?;
    let loaded = data::loader::load_file(path)?;
    let selection =
        data::columns::select_columns(&loaded, &config.time_column, &config.channel_column)?;
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let series = data::columns::to_waveform(&loaded, selection, label)?;
    Ok(analyze(&series, config))
}
