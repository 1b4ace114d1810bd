use serde::Serialize;

use crate::processing::periods::PeriodSeries;
use crate::processing::statistics::{self, StatKind, StatResult};

/// What the filter produced beyond the counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ThresholdOutcome {
    /// No block reached the threshold; no statistics.
    NothingAboveThreshold,
    Stats {
        full: StatResult,
        specific: StatResult,
    },
}

/// Blocks whose full period is at or above a threshold, with their statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterReport {
    pub threshold_us: f64,
    pub retained_count: usize,
    pub total_count: usize,
    pub filtered: PeriodSeries,
    pub outcome: ThresholdOutcome,
}

impl FilterReport {
    pub fn is_empty(&self) -> bool {
        self.retained_count == 0
    }
}

/// Keep blocks with `full >= threshold_us`, preserving order and the
/// full/specific pairing.
pub fn retain_at_or_above(periods: &PeriodSeries, threshold_us: f64) -> PeriodSeries {
    periods
        .records()
        .filter(|r| r.full_us >= threshold_us)
        .collect()
}

/// Filter `periods` against `threshold_us` and compute `kinds` over both
/// retained sequences.
pub fn filter_periods(periods: &PeriodSeries, threshold_us: f64, kinds: &[StatKind]) -> FilterReport {
    let filtered = retain_at_or_above(periods, threshold_us);
    let total_count = periods.len();
    let retained_count = filtered.len();

    tracing::debug!(
        "Threshold {threshold_us} us retained {retained_count}/{total_count} blocks"
    );

    let outcome = match (
        statistics::compute(filtered.full(), kinds),
        statistics::compute(filtered.specific(), kinds),
    ) {
        (Ok(full), Ok(specific)) => ThresholdOutcome::Stats { full, specific },
        _ => ThresholdOutcome::NothingAboveThreshold,
    };

    FilterReport {
        threshold_us,
        retained_count,
        total_count,
        filtered,
        outcome,
    }
}
