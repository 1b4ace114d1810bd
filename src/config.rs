use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::columns::{DEFAULT_CHANNEL_COLUMN, DEFAULT_TIME_COLUMN};
use crate::error::ValidationError;
use crate::processing::statistics::StatKind;

/// Settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum full period (microseconds) for a block to be retained.
    pub threshold_us: f64,
    /// Statistics to compute over the unfiltered periods, reported in canonical order.
    pub stats: Vec<StatKind>,
    pub time_column: String,
    pub channel_column: String,
}

impl AnalysisConfig {
    pub fn new(threshold_us: f64) -> Self {
        Self {
            threshold_us,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.threshold_us.is_nan() {
            return Err(ValidationError::InvalidThreshold("NaN".to_string()));
        }
        if self.stats.is_empty() {
            return Err(ValidationError::NoStats);
        }
        Ok(())
    }
}

/// Settings as written in a JSON config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub threshold_us: Option<f64>,
    pub stats: Option<Vec<StatKind>>,
    pub time_column: Option<String>,
    pub channel_column: Option<String>,
}

impl ConfigFile {
    pub fn from_json_file(path: &Path) -> Result<Self, ValidationError> {
        let config_error = |reason: String| ValidationError::Config {
            path: path.display().to_string(),
            reason,
        };
        let json = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| config_error(e.to_string()))
    }

    /// Resolve into run settings. A typed `threshold` wins over the file's
    /// `threshold_us`; with neither the run is rejected.
    pub fn into_config(self, threshold: Option<&str>) -> Result<AnalysisConfig, ValidationError> {
        let threshold_us = match (threshold, self.threshold_us) {
            (Some(raw), _) => parse_threshold(raw)?,
            (None, Some(value)) => value,
            (None, None) => return Err(ValidationError::MissingThreshold),
        };

        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            threshold_us,
            stats: self.stats.unwrap_or(defaults.stats),
            time_column: self.time_column.unwrap_or(defaults.time_column),
            channel_column: self.channel_column.unwrap_or(defaults.channel_column),
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold_us: 0.0,
            stats: StatKind::ALL.to_vec(),
            time_column: DEFAULT_TIME_COLUMN.to_string(),
            channel_column: DEFAULT_CHANNEL_COLUMN.to_string(),
        }
    }
}

/// Parse a threshold typed by a user. Surrounding whitespace is ignored;
/// empty, non-numeric and NaN input is rejected.
pub fn parse_threshold(input: &str) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingThreshold);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if !v.is_nan() => Ok(v),
        _ => Err(ValidationError::InvalidThreshold(input.to_string())),
    }
}

/// Parse a comma-separated list of statistic names, e.g. `mean,stdev`.
/// Duplicates are dropped.
pub fn parse_stats(input: &str) -> Result<Vec<StatKind>, ValidationError> {
    let mut kinds = Vec::new();
    for name in input.split(',').filter(|s| !s.trim().is_empty()) {
        let kind: StatKind = name.parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        return Err(ValidationError::NoStats);
    }
    Ok(kinds)
}
