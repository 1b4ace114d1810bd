use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// How the values of a time column are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// Plain seconds, e.g. `0.000125`.
    Seconds,
    /// RFC 3339 / ISO 8601, e.g. `2024-03-01T10:00:00.000125Z`. A missing
    /// offset is read as UTC.
    Rfc3339,
}

/// Pick the format that parses the most of the first 100 non-empty values.
pub fn detect_time_format(values: &[String]) -> Option<TimeFormat> {
    let sample: Vec<&str> = values
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(100)
        .collect();

    if sample.is_empty() {
        return None;
    }

    let numeric = sample.iter().filter(|s| s.parse::<f64>().is_ok()).count();
    let rfc3339 = sample
        .iter()
        .filter(|s| parse_iso_datetime(s).is_some())
        .count();

    match (numeric, rfc3339) {
        (0, 0) => None,
        (n, r) if n >= r => Some(TimeFormat::Seconds),
        _ => Some(TimeFormat::Rfc3339),
    }
}

/// Parses values of one time column into seconds.
///
/// RFC 3339 values are converted to seconds relative to the first parsed
/// value, which keeps sub-microsecond resolution that absolute epoch seconds
/// in an `f64` would lose.
pub struct TimeParser {
    format: TimeFormat,
    origin: Option<DateTime<FixedOffset>>,
}

impl TimeParser {
    pub fn new(format: TimeFormat) -> Self {
        Self { format, origin: None }
    }

    pub fn parse(&mut self, value: &str) -> Option<f64> {
        let value = value.trim();
        match self.format {
            TimeFormat::Seconds => value.parse::<f64>().ok().filter(|v| v.is_finite()),
            TimeFormat::Rfc3339 => {
                let dt = parse_iso_datetime(value)?;
                let origin = *self.origin.get_or_insert(dt);
                let delta = dt.signed_duration_since(origin);
                let nanos = delta.num_nanoseconds()?;
                Some(nanos as f64 / 1e9)
            }
        }
    }
}

fn parse_iso_datetime(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok().or_else(|| {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

/// Seconds in an ISO 8601 duration such as `PT1M2.5S` or `P1DT2H`.
/// Year and month designators are rejected since their length varies.
pub fn parse_iso_duration(value: &str) -> Option<f64> {
    let rest = value.trim().strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut seconds = 0.0;
    let mut any = false;
    for (part, units) in [
        (date_part, &[('W', 604_800.0), ('D', 86_400.0)][..]),
        (time_part.unwrap_or(""), &[('H', 3_600.0), ('M', 60.0), ('S', 1.0)][..]),
    ] {
        let mut number = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() || c == '.' || c == ',' {
                number.push(if c == ',' { '.' } else { c });
                continue;
            }
            let scale = units.iter().find(|(u, _)| *u == c).map(|(_, f)| *f)?;
            let n: f64 = number.parse().ok()?;
            seconds += n * scale;
            number.clear();
            any = true;
        }
        if !number.is_empty() {
            return None;
        }
    }

    if time_part == Some("") || !any {
        return None;
    }
    Some(seconds)
}
