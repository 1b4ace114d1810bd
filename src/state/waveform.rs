use serde::{Deserialize, Serialize};

use crate::error::{LoadError, LoadResult};

/// One logic-analyzer sample: a time in seconds and a digital level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub level: u8,
}

impl Sample {
    pub fn new(time: f64, level: u8) -> Self {
        Self { time, level }
    }
}

/// A digital channel captured over time.
///
/// Times are strictly increasing and levels are 0 or 1; both are checked at
/// construction so the processing stages can take them for granted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformSeries {
    pub label: String,
    samples: Vec<Sample>,
}

impl WaveformSeries {
    /// Build a series from parallel time and level columns.
    /// `row_of` maps a sample index to the row number reported in errors.
    pub fn from_columns(
        label: String,
        times: &[f64],
        levels: &[u8],
        row_of: impl Fn(usize) -> usize,
    ) -> LoadResult<Self> {
        if times.len() != levels.len() {
            return Err(LoadError::LengthMismatch {
                times: times.len(),
                levels: levels.len(),
            });
        }

        let mut samples = Vec::with_capacity(times.len());
        let mut previous: Option<f64> = None;

        for (i, (&time, &level)) in times.iter().zip(levels).enumerate() {
            let row = row_of(i);
            if !time.is_finite() {
                return Err(LoadError::BadTime { row, value: time.to_string() });
            }
            if level > 1 {
                return Err(LoadError::NonBinaryLevel { row, value: level.to_string() });
            }
            if let Some(prev) = previous {
                if time <= prev {
                    return Err(LoadError::NonIncreasingTime { row, previous: prev, time });
                }
            }
            previous = Some(time);
            samples.push(Sample::new(time, level));
        }

        Ok(Self { label, samples })
    }

    /// Build a series from `(time, level)` pairs.
    pub fn from_samples(label: impl Into<String>, samples: &[(f64, u8)]) -> LoadResult<Self> {
        let times: Vec<f64> = samples.iter().map(|s| s.0).collect();
        let levels: Vec<u8> = samples.iter().map(|s| s.1).collect();
        Self::from_columns(label.into(), &times, &levels, |i| i)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
