// Reads an uploaded workbook into the raw cell matrix the aggregation
// expects. All sheets are concatenated: the first contributing sheet keeps
// its header row, later sheets drop theirs.
use crate::error::LoadError;
use crate::types::CellValue;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

pub type Matrix = Vec<Vec<CellValue>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Csv,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Workbook),
            "csv" => Ok(SourceFormat::Csv),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Read the whole file into memory, then parse it. Either the complete
/// matrix comes back or a single error for the upload.
pub fn load_matrix(path: &Path) -> Result<Matrix, LoadError> {
    let format = SourceFormat::from_path(path)?;
    info!(file = %path.display(), ?format, "reading upload");
    let bytes = std::fs::read(path)?;
    parse_bytes(bytes, format)
}

pub fn parse_bytes(bytes: Vec<u8>, format: SourceFormat) -> Result<Matrix, LoadError> {
    let sheets = match format {
        SourceFormat::Workbook => workbook_sheets(bytes)?,
        SourceFormat::Csv => vec![csv_rows(&bytes)?],
    };
    Ok(combine_sheets(sheets))
}

fn workbook_sheets(bytes: Vec<u8>) -> Result<Vec<Matrix>, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in &names {
        let range = workbook.worksheet_range(name)?;
        let rows: Matrix = range
            .rows()
            .map(|r| trim_trailing_empty(r.iter().map(cell_from_data).collect()))
            .collect();
        debug!(sheet = %name, rows = rows.len(), "sheet read");
        sheets.push(rows);
    }
    Ok(sheets)
}

fn csv_rows(bytes: &[u8]) -> Result<Matrix, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(trim_trailing_empty(record.iter().map(cell_from_text).collect()));
    }
    debug!(rows = rows.len(), "csv read");
    Ok(rows)
}

/// Concatenate sheets. Sheets with fewer than two rows (nothing past a
/// header) contribute nothing.
pub fn combine_sheets(sheets: Vec<Matrix>) -> Matrix {
    let mut combined: Matrix = Vec::new();
    for sheet in sheets {
        if sheet.len() <= 1 {
            continue;
        }
        if combined.is_empty() {
            combined = sheet;
        } else {
            combined.extend(sheet.into_iter().skip(1));
        }
    }
    combined
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::Bool(v) => CellValue::Bool(*v),
        // Date cells stay as their serial number; interpretation is deferred.
        Data::DateTime(v) => CellValue::Number(v.as_f64()),
        Data::String(v) | Data::DateTimeIso(v) | Data::DurationIso(v) => CellValue::Text(v.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

// Numeric-looking CSV cells become numbers, as a spreadsheet would type them.
fn cell_from_text(field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }
    let trimmed = field.trim();
    if !trimmed.is_empty() && !trimmed.chars().any(|c| c.is_ascii_alphabetic()) {
        if let Ok(n) = trimmed.parse::<f64>() {
            return CellValue::Number(n);
        }
    }
    CellValue::Text(field.to_string())
}

fn trim_trailing_empty(mut row: Vec<CellValue>) -> Vec<CellValue> {
    while matches!(row.last(), Some(CellValue::Empty)) {
        row.pop();
    }
    row
}
