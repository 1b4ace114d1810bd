use crate::data::loader::LoadedData;
use crate::data::timestamp::{detect_time_format, TimeFormat, TimeParser};
use crate::error::{LoadError, LoadResult};
use crate::state::waveform::WaveformSeries;

/// Column names written by common logic-analyzer exports.
pub const DEFAULT_TIME_COLUMN: &str = "Time [s]";
pub const DEFAULT_CHANNEL_COLUMN: &str = "Channel 0";

/// The two columns the pipeline reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSelection {
    pub time: usize,
    pub channel: usize,
}

/// Resolve the time and channel columns.
///
/// An exact name match wins. Otherwise the time column is the first whose
/// name contains "time", and the channel column is the first other column
/// whose non-empty values are all 0 or 1.
pub fn select_columns(
    data: &LoadedData,
    time_name: &str,
    channel_name: &str,
) -> LoadResult<ColumnSelection> {
    let time = data
        .column_index(time_name)
        .or_else(|| {
            data.columns
                .iter()
                .position(|c| c.to_lowercase().contains("time"))
        })
        .ok_or_else(|| missing("time", time_name, data))?;

    let channel = data
        .column_index(channel_name)
        .filter(|&i| i != time)
        .or_else(|| {
            (0..data.columns.len()).find(|&i| i != time && is_binary_column(data.column(i)))
        })
        .ok_or_else(|| missing("channel", channel_name, data))?;

    if data.columns[time] != time_name || data.columns[channel] != channel_name {
        tracing::warn!(
            "Using columns {:?} (time) and {:?} (channel)",
            data.columns[time],
            data.columns[channel]
        );
    }

    Ok(ColumnSelection { time, channel })
}

fn missing(role: &'static str, wanted: &str, data: &LoadedData) -> LoadError {
    LoadError::MissingColumn {
        role,
        wanted: wanted.to_string(),
        available: data.columns.clone(),
    }
}

fn is_binary_column(values: &[String]) -> bool {
    let mut seen = false;
    for v in values.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if parse_level(v).is_none() {
            return false;
        }
        seen = true;
    }
    seen
}

/// Parse a digital level. Accepts `0`/`1` in any numeric spelling (`1.0`, `0e0`).
pub fn parse_level(value: &str) -> Option<u8> {
    match value.trim().parse::<f64>() {
        Ok(v) if v == 0.0 => Some(0),
        Ok(v) if v == 1.0 => Some(1),
        _ => None,
    }
}

/// Convert the selected columns into a validated waveform.
pub fn to_waveform(
    data: &LoadedData,
    selection: ColumnSelection,
    label: String,
) -> LoadResult<WaveformSeries> {
    let raw_times = data.column(selection.time);
    let raw_levels = data.column(selection.channel);

    let format = detect_time_format(raw_times).unwrap_or(TimeFormat::Seconds);
    let mut parser = TimeParser::new(format);

    let mut times = Vec::with_capacity(data.row_count);
    let mut levels = Vec::with_capacity(data.row_count);

    for (i, (t, l)) in raw_times.iter().zip(raw_levels.iter()).enumerate() {
        let row = data.line_of(i);
        let time = parser.parse(t).ok_or_else(|| LoadError::BadTime {
            row,
            value: t.clone(),
        })?;
        let level = parse_level(l).ok_or_else(|| LoadError::NonBinaryLevel {
            row,
            value: l.clone(),
        })?;
        times.push(time);
        levels.push(level);
    }

    WaveformSeries::from_columns(label, &times, &levels, |i| data.line_of(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;

    #[test]
    fn exact_names_are_used() {
        let data = parse_csv("Channel 1,Time [s],Channel 0\n1,0.0,0\n0,0.1,1\n").unwrap();
        let sel = select_columns(&data, DEFAULT_TIME_COLUMN, DEFAULT_CHANNEL_COLUMN).unwrap();
        assert_eq!(sel, ColumnSelection { time: 1, channel: 2 });
    }

    #[test]
    fn falls_back_to_discovery() {
        let data = parse_csv("Timestamp,Label,Sig\n0.0,a,0\n0.1,b,1\n").unwrap();
        let sel = select_columns(&data, DEFAULT_TIME_COLUMN, DEFAULT_CHANNEL_COLUMN).unwrap();
        assert_eq!(sel, ColumnSelection { time: 0, channel: 2 });
    }

    #[test]
    fn missing_channel_is_load_error() {
        let data = parse_csv("Time [s],Voltage\n0.0,3.3\n0.1,1.2\n").unwrap();
        let err = select_columns(&data, DEFAULT_TIME_COLUMN, DEFAULT_CHANNEL_COLUMN).unwrap_err();
        match err {
            LoadError::MissingColumn { role, available, .. } => {
                assert_eq!(role, "channel");
                assert_eq!(available, vec!["Time [s]", "Voltage"]);
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn builds_waveform() {
        let data = parse_csv("Time [s],Channel 0\n0.0,0\n0.5,1.0\n1.0,0\n").unwrap();
        let sel = select_columns(&data, DEFAULT_TIME_COLUMN, DEFAULT_CHANNEL_COLUMN).unwrap();
        let wave = to_waveform(&data, sel, "capture".to_string()).unwrap();
        assert_eq!(wave.len(), 3);
        assert_eq!(wave.samples()[1].level, 1);
    }

    #[test]
    fn non_binary_level_is_rejected() {
        let data = parse_csv("Time [s],Channel 0\n0.0,0\n0.5,2\n").unwrap();
        let sel = ColumnSelection { time: 0, channel: 1 };
        let err = to_waveform(&data, sel, "capture".to_string()).unwrap_err();
        assert!(matches!(err, LoadError::NonBinaryLevel { row: 3, .. }));
    }

    #[test]
    fn decreasing_time_is_rejected() {
        let data = parse_csv("Time [s],Channel 0\n0.0,0\n0.5,1\n0.4,0\n").unwrap();
        let sel = ColumnSelection { time: 0, channel: 1 };
        let err = to_waveform(&data, sel, "capture".to_string()).unwrap_err();
        assert!(matches!(err, LoadError::NonIncreasingTime { row: 4, .. }));
    }

    #[test]
    fn iso_time_column_becomes_relative_seconds() {
        let data = parse_csv(
            "Time,Channel 0\n2024-03-01T10:00:00Z,0\n2024-03-01T10:00:00.000002Z,1\n",
        )
        .unwrap();
        let sel = select_columns(&data, DEFAULT_TIME_COLUMN, DEFAULT_CHANNEL_COLUMN).unwrap();
        let wave = to_waveform(&data, sel, "capture".to_string()).unwrap();
        assert_eq!(wave.samples()[0].time, 0.0);
        assert!((wave.samples()[1].time - 2e-6).abs() < 1e-12);
    }

    #[test]
    fn errors_report_file_lines_past_blank_rows() {
        let data = parse_csv("Export\n\nTime [s],Channel 0\n0.0,0\n\n0.5,7\n").unwrap();
        let sel = ColumnSelection { time: 0, channel: 1 };
        let err = to_waveform(&data, sel, "capture".to_string()).unwrap_err();
        assert!(matches!(err, LoadError::NonBinaryLevel { row: 6, .. }), "{err}");
    }
}
