use serde::{Deserialize, Serialize};

/// Rising edges that make up one instrumented call.
pub const EDGES_PER_BLOCK: usize = 4;

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Timing of one call, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// First to fourth rising edge.
    pub full_us: f64,
    /// Second to third rising edge.
    pub specific_us: f64,
}

impl PeriodRecord {
    /// Derive the record for one block `[e0, e1, e2, e3]` of edge times in seconds.
    pub fn from_block(block: &[f64; EDGES_PER_BLOCK]) -> Self {
        let [e0, e1, e2, e3] = *block;
        Self {
            full_us: (e3 - e0) * MICROS_PER_SECOND,
            specific_us: (e2 - e1) * MICROS_PER_SECOND,
        }
    }
}

/// Full and specific periods kept index-aligned, one entry per block.
///
/// Both vectors only ever grow together, so entry `i` of each always refers
/// to the same block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodSeries {
    full: Vec<f64>,
    specific: Vec<f64>,
}

impl PeriodSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            full: Vec::with_capacity(capacity),
            specific: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: PeriodRecord) {
        self.full.push(record.full_us);
        self.specific.push(record.specific_us);
    }

    pub fn full(&self) -> &[f64] {
        &self.full
    }

    pub fn specific(&self) -> &[f64] {
        &self.specific
    }

    pub fn len(&self) -> usize {
        self.full.len()
    }

    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = PeriodRecord> + '_ {
        self.full
            .iter()
            .zip(self.specific.iter())
            .map(|(&full_us, &specific_us)| PeriodRecord { full_us, specific_us })
    }
}

impl FromIterator<PeriodRecord> for PeriodSeries {
    fn from_iter<T: IntoIterator<Item = PeriodRecord>>(iter: T) -> Self {
        let mut series = PeriodSeries::new();
        for record in iter {
            series.push(record);
        }
        series
    }
}

/// Result of grouping edges into blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub periods: PeriodSeries,
    /// Edges left over after the last complete block.
    pub discarded_edges: usize,
}

/// Group rising edges into consecutive blocks of four and derive the periods
/// of each. A trailing group of fewer than four edges is dropped.
pub fn extract_periods(edges: &[f64]) -> Extraction {
    let chunks = edges.chunks_exact(EDGES_PER_BLOCK);
    let discarded_edges = chunks.remainder().len();

    let mut periods = PeriodSeries::with_capacity(edges.len() / EDGES_PER_BLOCK);
    for chunk in chunks {
        let block = [chunk[0], chunk[1], chunk[2], chunk[3]];
        periods.push(PeriodRecord::from_block(&block));
    }

    Extraction { periods, discarded_edges }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_blocks_closed_form() {
        let edges = [0.0, 1.0, 2.0, 4.0, 10.0, 11.0, 12.0, 14.0];
        let out = extract_periods(&edges);
        assert_eq!(out.periods.full(), &[4_000_000.0, 4_000_000.0]);
        assert_eq!(out.periods.specific(), &[1_000_000.0, 1_000_000.0]);
        assert_eq!(out.discarded_edges, 0);
    }

    #[test]
    fn n_blocks_from_4n_edges() {
        let mut edges = Vec::new();
        for i in 0..25 {
            let t0 = i as f64 * 0.01;
            edges.extend_from_slice(&[t0, t0 + 0.001, t0 + 0.003, t0 + 0.004 + i as f64 * 1e-5]);
        }
        let out = extract_periods(&edges);
        assert_eq!(out.periods.len(), 25);
        for (i, record) in out.periods.records().enumerate() {
            let expected_full = (0.004 + i as f64 * 1e-5) * 1e6;
            assert!((record.full_us - expected_full).abs() < 1e-6);
            assert!((record.specific_us - 2000.0).abs() < 1e-6);
            assert!(record.full_us >= record.specific_us);
        }
    }

    #[test]
    fn trailing_partial_block_is_dropped() {
        let edges = [0.0, 1.0, 2.0, 4.0, 10.0, 11.0, 12.0];
        let out = extract_periods(&edges);
        assert_eq!(out.periods.len(), 1);
        assert_eq!(out.discarded_edges, 3);
        assert_eq!(out.periods.full().len(), out.periods.specific().len());
    }

    #[test]
    fn fewer_than_four_edges_is_empty() {
        for n in 0..4 {
            let edges: Vec<f64> = (0..n).map(|i| i as f64).collect();
            let out = extract_periods(&edges);
            assert!(out.periods.is_empty());
            assert_eq!(out.discarded_edges, n);
        }
    }

    #[test]
    fn collect_keeps_alignment() {
        let series: PeriodSeries = vec![
            PeriodRecord { full_us: 10.0, specific_us: 2.0 },
            PeriodRecord { full_us: 20.0, specific_us: 5.0 },
        ]
        .into_iter()
        .collect();
        assert_eq!(series.full(), &[10.0, 20.0]);
        assert_eq!(series.specific(), &[2.0, 5.0]);
    }
}
