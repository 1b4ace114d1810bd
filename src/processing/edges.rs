use crate::state::waveform::WaveformSeries;

/// Timestamps (seconds) of every 0 -> 1 transition, in capture order.
/// The timestamp is that of the first sample at the new level.
pub fn rising_edges(series: &WaveformSeries) -> Vec<f64> {
    transitions(series, 1)
}

/// Timestamps of every 1 -> 0 transition. Only used for diagnostics.
pub fn falling_edges(series: &WaveformSeries) -> Vec<f64> {
    transitions(series, -1)
}

fn transitions(series: &WaveformSeries, step: i16) -> Vec<f64> {
    series
        .samples()
        .windows(2)
        .filter(|w| i16::from(w[1].level) - i16::from(w[0].level) == step)
        .map(|w| w[1].time)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(samples: &[(f64, u8)]) -> WaveformSeries {
        WaveformSeries::from_samples("Channel 0", samples).unwrap()
    }

    #[test]
    fn edge_time_is_sample_after_transition() {
        let s = series(&[(0.0, 0), (0.1, 0), (0.2, 1), (0.3, 1), (0.4, 0), (0.5, 1)]);
        assert_eq!(rising_edges(&s), vec![0.2, 0.5]);
        assert_eq!(falling_edges(&s), vec![0.4]);
    }

    #[test]
    fn first_sample_high_is_not_an_edge() {
        let s = series(&[(0.0, 1), (1.0, 1), (2.0, 0), (3.0, 1)]);
        assert_eq!(rising_edges(&s), vec![3.0]);
    }

    #[test]
    fn flat_or_tiny_series_has_no_edges() {
        assert!(rising_edges(&series(&[])).is_empty());
        assert!(rising_edges(&series(&[(0.0, 0)])).is_empty());
        assert!(rising_edges(&series(&[(0.0, 0), (1.0, 0), (2.0, 0)])).is_empty());
    }
}
