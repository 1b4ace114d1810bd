use std::fmt;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::processing::edges;
use crate::processing::periods::{self, PeriodSeries};
use crate::processing::statistics::{self, StatKind, StatResult};
use crate::processing::threshold::{self, FilterReport, ThresholdOutcome};
use crate::state::waveform::WaveformSeries;

/// Statistics over one period sequence, or nothing if there were no blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "stats", rename_all = "snake_case")]
pub enum SeriesSummary {
    Empty,
    Stats(StatResult),
}

impl SeriesSummary {
    fn of(values: &[f64], config: &AnalysisConfig) -> Self {
        match statistics::compute(values, &config.stats) {
            Ok(stats) => SeriesSummary::Stats(stats),
            Err(_) => SeriesSummary::Empty,
        }
    }

    pub fn stats(&self) -> Option<&StatResult> {
        match self {
            SeriesSummary::Empty => None,
            SeriesSummary::Stats(stats) => Some(stats),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SeriesSummary::Empty)
    }
}

/// Everything one run over a capture produced. Period values are microseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub source: String,
    pub sample_count: usize,
    pub rising_edge_count: usize,
    pub block_count: usize,
    /// Trailing rising edges that did not fill a block.
    pub discarded_edges: usize,
    pub periods: PeriodSeries,
    pub full: SeriesSummary,
    pub specific: SeriesSummary,
    pub threshold: FilterReport,
}

impl AnalysisReport {
    /// True when the capture contained no complete 4-edge block.
    pub fn is_empty(&self) -> bool {
        self.block_count == 0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Run the whole pipeline over one waveform.
pub fn analyze(series: &WaveformSeries, config: &AnalysisConfig) -> AnalysisReport {
    let rising = edges::rising_edges(series);
    if tracing::enabled!(tracing::Level::DEBUG) {
        tracing::debug!(
            "{}: {} rising / {} falling edges over {} samples",
            series.label,
            rising.len(),
            edges::falling_edges(series).len(),
            series.len()
        );
    }

    let extraction = periods::extract_periods(&rising);
    if extraction.discarded_edges > 0 {
        tracing::warn!(
            "{}: dropping {} trailing edge(s) that do not form a full block",
            series.label,
            extraction.discarded_edges
        );
    }
    let blocks = extraction.periods;

    let full = SeriesSummary::of(blocks.full(), config);
    let specific = SeriesSummary::of(blocks.specific(), config);
    // The threshold section always carries all six statistics.
    let filter = threshold::filter_periods(&blocks, config.threshold_us, &StatKind::ALL);

    tracing::info!(
        "{}: {} blocks, {}/{} at or above {} us",
        series.label,
        blocks.len(),
        filter.retained_count,
        filter.total_count,
        config.threshold_us
    );

    AnalysisReport {
        source: series.label.clone(),
        sample_count: series.len(),
        rising_edge_count: rising.len(),
        block_count: blocks.len(),
        discarded_edges: extraction.discarded_edges,
        periods: blocks,
        full,
        specific,
        threshold: filter,
    }
}

fn write_summary(f: &mut fmt::Formatter<'_>, summary: &SeriesSummary) -> fmt::Result {
    match summary {
        SeriesSummary::Empty => writeln!(f, "No complete 4-edge blocks found."),
        SeriesSummary::Stats(stats) => write_stats(f, stats),
    }
}

fn write_stats(f: &mut fmt::Formatter<'_>, stats: &StatResult) -> fmt::Result {
    for (kind, outcome) in stats.iter() {
        match outcome {
            Ok(value) => writeln!(f, "{}: {}", kind.label(), value)?,
            Err(e) => writeln!(f, "{}: n/a ({})", kind.label(), e)?,
        }
    }
    Ok(())
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.source)?;
        writeln!(
            f,
            "Samples: {}, rising edges: {}, blocks: {}",
            self.sample_count, self.rising_edge_count, self.block_count
        )?;

        writeln!(f, "\nFull Function Statistics:")?;
        write_summary(f, &self.full)?;
        writeln!(f, "\nSpecific Part Statistics:")?;
        write_summary(f, &self.specific)?;

        let t = &self.threshold;
        writeln!(
            f,
            "\nBlocks at or above threshold: {}/{}",
            t.retained_count, t.total_count
        )?;
        match &t.outcome {
            ThresholdOutcome::NothingAboveThreshold => writeln!(
                f,
                "No function lengths are above the specified threshold of {} microseconds.",
                t.threshold_us
            ),
            ThresholdOutcome::Stats { full, specific } => {
                writeln!(
                    f,
                    "\nStatistics for full functions with lengths above {} microseconds:",
                    t.threshold_us
                )?;
                write_stats(f, full)?;
                writeln!(f, "\nStatistics for specific parts of the function:")?;
                write_stats(f, specific)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Square pulses rising at each of `edge_times`, sampled every `dt`.
    fn pulse_train(edge_times: &[f64], dt: f64) -> WaveformSeries {
        let mut samples = vec![(0.0, 0u8)];
        for &t in edge_times {
            samples.push((t, 1));
            samples.push((t + dt, 0));
        }
        samples.push((edge_times.last().copied().unwrap_or(0.0) + 2.0 * dt, 0));
        WaveformSeries::from_samples("capture.csv", &samples).unwrap()
    }

    #[test]
    fn end_to_end_two_blocks() {
        let series = pulse_train(&[1.0, 2.0, 3.0, 5.0, 10.0, 11.0, 12.0, 14.0], 0.25);
        let report = analyze(&series, &AnalysisConfig::new(0.0));

        assert_eq!(report.rising_edge_count, 8);
        assert_eq!(report.block_count, 2);
        assert_eq!(report.periods.full(), &[4_000_000.0, 4_000_000.0]);
        assert_eq!(report.periods.specific(), &[1_000_000.0, 1_000_000.0]);

        let full = report.full.stats().unwrap();
        assert_eq!(full.number(StatKind::Mean), Some(4_000_000.0));
        assert_eq!(full.number(StatKind::Stdev), Some(0.0));
        assert_eq!(full.number(StatKind::Mode), Some(4_000_000.0));
        assert_eq!(report.threshold.retained_count, 2);
    }

    #[test]
    fn too_few_edges_is_an_empty_report() {
        let series = pulse_train(&[1.0, 2.0, 3.0], 0.1);
        let report = analyze(&series, &AnalysisConfig::new(0.0));
        assert!(report.is_empty());
        assert_eq!(report.discarded_edges, 3);
        assert!(report.full.is_empty());
        assert!(report.specific.is_empty());
        assert!(report.threshold.is_empty());

        let text = report.to_string();
        assert!(text.contains("No complete 4-edge blocks found."));
        assert!(text.contains("Blocks at or above threshold: 0/0"));
    }

    #[test]
    fn no_edges_at_all() {
        let series = WaveformSeries::from_samples("flat", &[(0.0, 0), (1.0, 0)]).unwrap();
        let report = analyze(&series, &AnalysisConfig::default());
        assert!(report.is_empty());
        assert_eq!(report.rising_edge_count, 0);
    }

    #[test]
    fn text_report_lists_requested_stats() {
        let series = pulse_train(&[1.0, 2.0, 3.0, 5.0], 0.25);
        let config = AnalysisConfig {
            stats: vec![StatKind::Mean, StatKind::Stdev],
            ..AnalysisConfig::new(5_000_000.0)
        };
        let text = analyze(&series, &config).to_string();

        assert!(text.contains("Full Function Statistics:\nMean: 4000000\n"));
        assert!(text.contains("Stdev: n/a (stdev requires at least 2 data points, got 1)"));
        assert!(!text.contains("Median"));
        assert!(text.contains(
            "No function lengths are above the specified threshold of 5000000 microseconds."
        ));
    }

    #[test]
    fn json_report_shape() {
        let series = pulse_train(&[1.0, 2.0, 3.0, 5.0, 6.0, 6.5, 7.0, 7.5], 0.1);
        let report = analyze(&series, &AnalysisConfig::new(2_000_000.0));
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["block_count"], 2);
        assert_eq!(json["full"]["state"], "stats");
        assert_eq!(json["full"]["stats"]["max"], 4_000_000.0);
        assert_eq!(json["threshold"]["retained_count"], 1);
        assert_eq!(json["threshold"]["outcome"]["state"], "stats");
        assert_eq!(json["threshold"]["outcome"]["full"]["mode"], 4_000_000.0);
    }

    #[test]
    fn threshold_stats_ignore_requested_subset() {
        let series = pulse_train(&[1.0, 2.0, 3.0, 5.0, 6.0, 6.5, 7.0, 7.5], 0.1);
        let config = AnalysisConfig {
            stats: vec![StatKind::Mean],
            ..AnalysisConfig::new(0.0)
        };
        let report = analyze(&series, &config);

        assert_eq!(report.full.stats().unwrap().iter().count(), 1);
        match &report.threshold.outcome {
            ThresholdOutcome::Stats { full, specific } => {
                assert_eq!(full.iter().count(), 6);
                assert_eq!(specific.iter().count(), 6);
                assert_eq!(full.number(StatKind::Max), Some(4_000_000.0));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let text = report.to_string();
        assert!(text.contains("Statistics for full functions with lengths above 0 microseconds:"));
        assert!(text.contains("Median: "));
    }
}
