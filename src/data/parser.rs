use std::collections::HashMap;

/// Locate the header row in raw rows read from a capture export.
///
/// Logic-analyzer exports sometimes carry a preamble (device name, sample
/// rate) ahead of the table. The header is the last all-text row, scanning
/// upward, whose width matches the most common row width. Falls back to row 0.
pub fn detect_header_row(rows: &[Vec<String>]) -> Option<usize> {
    if rows.is_empty() {
        return None;
    }

    let mut counts: HashMap<usize, usize> = HashMap::new();
    for row in rows {
        *counts.entry(non_empty_width(row)).or_insert(0) += 1;
    }
    // Ties prefer the wider table.
    let most_common = counts
        .into_iter()
        .max_by_key(|&(len, c)| (c, len))
        .map(|(len, _)| len)
        .unwrap_or(0);

    let header = (0..rows.len()).rev().find(|&i| {
        let row = &rows[i];
        non_empty_width(row) == most_common && most_common > 0 && is_text_row(row)
    });

    Some(header.unwrap_or(0))
}

fn non_empty_width(row: &[String]) -> usize {
    row.iter().filter(|c| !c.trim().is_empty()).count()
}

/// True when every non-empty cell is text rather than a number.
fn is_text_row(row: &[String]) -> bool {
    row.iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .all(|c| c.parse::<f64>().is_err() && !looks_like_timestamp(c))
}

fn looks_like_timestamp(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&str]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|l| l.split(',').map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn plain_header_is_row_zero() {
        let r = rows(&["Time [s],Channel 0", "0.0,0", "0.1,1"]);
        assert_eq!(detect_header_row(&r), Some(0));
    }

    #[test]
    fn skips_preamble() {
        let r = rows(&[
            "Saleae Logic export",
            "Sample rate: 24 MHz",
            "Time [s],Channel 0",
            "0.0,0",
            "0.1,1",
            "0.2,0",
        ]);
        assert_eq!(detect_header_row(&r), Some(2));
    }

    #[test]
    fn iso_timestamps_are_not_headers() {
        let r = rows(&[
            "Time,Channel 0",
            "2024-03-01T10:00:00.000000Z,0",
            "2024-03-01T10:00:00.000001Z,1",
        ]);
        assert_eq!(detect_header_row(&r), Some(0));
    }

    #[test]
    fn headerless_falls_back_to_zero() {
        let r = rows(&["0.0,0", "0.1,1"]);
        assert_eq!(detect_header_row(&r), Some(0));
        assert_eq!(detect_header_row(&[]), None);
    }
}
