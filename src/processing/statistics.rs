use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{StatsError, ValidationError};

/// A descriptive statistic that can be requested from [`compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Mean,
    Stdev,
    Min,
    Max,
    Median,
    Mode,
}

impl StatKind {
    pub const ALL: [StatKind; 6] = [
        StatKind::Mean,
        StatKind::Stdev,
        StatKind::Min,
        StatKind::Max,
        StatKind::Median,
        StatKind::Mode,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StatKind::Mean => "mean",
            StatKind::Stdev => "stdev",
            StatKind::Min => "min",
            StatKind::Max => "max",
            StatKind::Median => "median",
            StatKind::Mode => "mode",
        }
    }

    /// Title-cased name used in text reports.
    pub fn label(&self) -> &'static str {
        match self {
            StatKind::Mean => "Mean",
            StatKind::Stdev => "Stdev",
            StatKind::Min => "Min",
            StatKind::Max => "Max",
            StatKind::Median => "Median",
            StatKind::Mode => "Mode",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StatKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        StatKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| ValidationError::UnknownStat(s.to_string()))
    }
}

/// Outcome of a mode computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModeResult {
    Unique(f64),
    /// Two or more values share the highest frequency.
    NoUniqueMode,
}

/// A successfully computed statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue {
    Number(f64),
    Mode(ModeResult),
}

impl StatValue {
    /// The numeric value, if there is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StatValue::Number(v) | StatValue::Mode(ModeResult::Unique(v)) => Some(*v),
            StatValue::Mode(ModeResult::NoUniqueMode) => None,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_f64() {
            Some(v) => write!(f, "{v}"),
            None => f.write_str("No unique mode"),
        }
    }
}

pub type StatOutcome = Result<StatValue, StatsError>;

/// Requested statistics and their outcomes, keyed in canonical kind order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatResult {
    entries: BTreeMap<StatKind, StatOutcome>,
}

impl StatResult {
    pub fn get(&self, kind: StatKind) -> Option<&StatOutcome> {
        self.entries.get(&kind)
    }

    /// Numeric value for `kind`, `None` if not requested, failed, or no unique mode.
    pub fn number(&self, kind: StatKind) -> Option<f64> {
        match self.entries.get(&kind) {
            Some(Ok(value)) => value.as_f64(),
            _ => None,
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = StatKind> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKind, &StatOutcome)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for StatResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (kind, outcome) in &self.entries {
            match outcome {
                Ok(StatValue::Number(v)) | Ok(StatValue::Mode(ModeResult::Unique(v))) => {
                    map.serialize_entry(kind.name(), v)?
                }
                Ok(StatValue::Mode(ModeResult::NoUniqueMode)) => {
                    map.serialize_entry(kind.name(), "no unique mode")?
                }
                Err(e) => {
                    let mut err = BTreeMap::new();
                    err.insert("error", e.to_string());
                    map.serialize_entry(kind.name(), &err)?
                }
            }
        }
        map.end()
    }
}

type StatFn = fn(&[f64]) -> StatOutcome;

impl StatKind {
    /// Dispatch table from kind to implementation. Every function receives a
    /// non-empty slice.
    fn function(self) -> StatFn {
        match self {
            StatKind::Mean => mean,
            StatKind::Stdev => stdev,
            StatKind::Min => min,
            StatKind::Max => max,
            StatKind::Median => median,
            StatKind::Mode => mode,
        }
    }
}

/// Compute the requested statistics over `data`.
///
/// Only the requested kinds appear in the result. A failure of one statistic
/// (e.g. stdev over a single value) is recorded against that kind alone.
/// Fails only when `data` is empty.
pub fn compute(data: &[f64], kinds: &[StatKind]) -> Result<StatResult, StatsError> {
    if data.is_empty() {
        return Err(StatsError::EmptyInput);
    }

    let entries = kinds
        .iter()
        .map(|&kind| (kind, kind.function()(data)))
        .collect();

    Ok(StatResult { entries })
}

fn mean_of(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

fn mean(data: &[f64]) -> StatOutcome {
    Ok(StatValue::Number(mean_of(data)))
}

/// Sample standard deviation (n - 1 denominator).
fn stdev(data: &[f64]) -> StatOutcome {
    let n = data.len();
    if n < 2 {
        return Err(StatsError::InsufficientData {
            kind: StatKind::Stdev,
            required: 2,
            got: n,
        });
    }
    let m = mean_of(data);
    let variance = data.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    Ok(StatValue::Number(variance.sqrt()))
}

fn min(data: &[f64]) -> StatOutcome {
    Ok(StatValue::Number(data.iter().copied().fold(f64::INFINITY, f64::min)))
}

fn max(data: &[f64]) -> StatOutcome {
    Ok(StatValue::Number(data.iter().copied().fold(f64::NEG_INFINITY, f64::max)))
}

fn median(data: &[f64]) -> StatOutcome {
    let mut vals = data.to_vec();
    vals.sort_by(|a, b| a.total_cmp(b));
    let count = vals.len();
    let median = if count % 2 == 0 {
        (vals[count / 2 - 1] + vals[count / 2]) / 2.0
    } else {
        vals[count / 2]
    };
    Ok(StatValue::Number(median))
}

fn mode(data: &[f64]) -> StatOutcome {
    // Key on the bit pattern; +0.0 folds -0.0 into 0.0.
    let mut counts: HashMap<u64, (f64, usize)> = HashMap::new();
    for &v in data {
        let v = v + 0.0;
        counts.entry(v.to_bits()).or_insert((v, 0)).1 += 1;
    }

    let best = counts.values().map(|&(_, c)| c).max().unwrap_or(0);
    let mut leaders = counts.values().filter(|&&(_, c)| c == best);

    let result = match (leaders.next(), leaders.next()) {
        (Some(&(value, _)), None) => ModeResult::Unique(value),
        _ => ModeResult::NoUniqueMode,
    };
    Ok(StatValue::Mode(result))
}
