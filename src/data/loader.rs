use std::path::Path;

use crate::data::parser;
use crate::data::timestamp::parse_iso_duration;
use crate::error::{LoadError, LoadResult};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A capture export as read from disk: column names and column data as strings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedData {
    pub columns: Vec<String>,
    pub column_data: Vec<Vec<String>>, // column-major: column_data[col_idx][row_idx]
    pub row_count: usize,
    /// 1-based file line (CSV) or sheet row (workbook) of each data row.
    pub row_lines: Vec<usize>,
}

impl LoadedData {
    /// Build from raw rows paired with their 1-based line numbers, locating
    /// the header first.
    pub fn from_rows(all_rows: Vec<(usize, Vec<String>)>) -> LoadResult<Self> {
        let (lines, cells): (Vec<usize>, Vec<Vec<String>>) = all_rows.into_iter().unzip();
        let header_row = parser::detect_header_row(&cells).ok_or(LoadError::NoData)?;
        if header_row >= cells.len() {
            return Err(LoadError::NoData);
        }

        let columns: Vec<String> = cells[header_row]
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        let data_rows = &cells[header_row + 1..];
        let num_cols = columns.len();
        let mut column_data: Vec<Vec<String>> = vec![Vec::with_capacity(data_rows.len()); num_cols];

        for row in data_rows {
            for (col_idx, col_data) in column_data.iter_mut().enumerate() {
                col_data.push(row.get(col_idx).map(|s| s.trim().to_string()).unwrap_or_default());
            }
        }

        Ok(LoadedData {
            columns,
            column_data,
            row_count: data_rows.len(),
            row_lines: lines[header_row + 1..].to_vec(),
        })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, idx: usize) -> &[String] {
        &self.column_data[idx]
    }

    /// Line number to report for data row `row_idx`.
    pub fn line_of(&self, row_idx: usize) -> usize {
        self.row_lines.get(row_idx).copied().unwrap_or(row_idx + 1)
    }
}

/// Load a CSV or spreadsheet capture export.
pub fn load_file(path: &Path) -> LoadResult<LoadedData> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let loaded = match ext.as_str() {
        "csv" => load_csv(path),
        "xls" | "xlsx" | "xlsm" => load_excel(path),
        _ => Err(LoadError::UnsupportedFormat(ext)),
    }?;

    tracing::info!(
        "Loaded {} rows x {} columns from {:?}",
        loaded.row_count,
        loaded.columns.len(),
        path
    );
    Ok(loaded)
}

fn load_csv(path: &Path) -> LoadResult<LoadedData> {
    let content = std::fs::read(path)?;
    // Fall back to latin1 when the export is not UTF-8.
    let text = match String::from_utf8(content) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    };
    parse_csv(&text)
}

/// Parse CSV text into a table. Blank lines are skipped.
pub fn parse_csv(text: &str) -> LoadResult<LoadedData> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut all_rows: Vec<(usize, Vec<String>)> = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(all_rows.len() + 1);
        let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        if row.iter().any(|c| !c.trim().is_empty()) {
            all_rows.push((line, row));
        }
    }

    if all_rows.is_empty() {
        return Err(LoadError::NoData);
    }
    LoadedData::from_rows(all_rows)
}

/// Render one workbook cell as text. Date, time and duration cells become
/// seconds so a time column reads the same as a CSV export.
pub fn cell_to_string(cell: &calamine::Data) -> String {
    use calamine::Data;

    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => u8::from(*b).to_string(),
        Data::DateTime(dt) => (dt.as_f64() * SECONDS_PER_DAY).to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => match parse_iso_duration(s) {
            Some(seconds) => seconds.to_string(),
            None => s.clone(),
        },
        Data::Error(e) => format!("{e:?}"),
    }
}

/// Rows of a worksheet range paired with their 1-based sheet row. Blank rows are skipped.
pub fn range_rows(range: &calamine::Range<calamine::Data>) -> Vec<(usize, Vec<String>)> {
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    range
        .rows()
        .enumerate()
        .map(|(i, row)| {
            let cells: Vec<String> = row.iter().map(cell_to_string).collect();
            (first_row + i + 1, cells)
        })
        .filter(|(_, cells)| cells.iter().any(|c| !c.is_empty()))
        .collect()
}

fn load_excel(path: &Path) -> LoadResult<LoadedData> {
    use calamine::{open_workbook_auto, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| LoadError::Workbook(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::Workbook("No sheets found".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::Workbook(format!("Cannot read sheet {sheet_name}: {e}")))?;

    let all_rows = range_rows(&range);
    if all_rows.is_empty() {
        return Err(LoadError::NoData);
    }
    LoadedData::from_rows(all_rows)
}
