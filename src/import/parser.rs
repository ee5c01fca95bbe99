//! Spreadsheet parsing - CSV and Excel files normalized to one row shape
//!
//! Both formats produce a [`ParsedFile`]: the literal header strings plus one
//! string map per data line. Blank cells are absent from the map. The header
//! mapper never sees format-specific details.

use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

/// A raw spreadsheet row: literal header string -> trimmed cell text.
pub type RawRow = HashMap<String, String>;

/// A fully materialized spreadsheet, headers preserved in file order.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl ParsedFile {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Errors from reading an uploaded spreadsheet
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error at row {row}: {source}")]
    Csv {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read CSV headers: {0}")]
    CsvHeaders(#[source] csv::Error),

    #[error("Failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook has no sheets")]
    NoSheets,

    #[error("Sheet '{0}' has no header row")]
    EmptySheet(String),

    #[error("Unsupported file type '{0}' (expected .csv, .xls, .xlsx, .xlsm, or .ods)")]
    UnsupportedExtension(String),
}

/// Parse a spreadsheet by file extension.
pub fn parse_file(path: &Path) -> Result<ParsedFile, ParseError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => parse_csv(path),
        "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => parse_workbook(path),
        other => Err(ParseError::UnsupportedExtension(other.to_string())),
    }
}

/// Parse a CSV file into the normalized row shape.
pub fn parse_csv(path: &Path) -> Result<ParsedFile, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = rdr
        .headers()
        .map_err(ParseError::CsvHeaders)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        // Row numbers reported to the user are 1-based over data lines
        let record = result.map_err(|source| ParseError::Csv { row: idx + 1, source })?;
        let mut row = RawRow::new();
        for (col, header) in headers.iter().enumerate() {
            if let Some(value) = record.get(col) {
                let value = value.trim();
                if !value.is_empty() {
                    row.insert(header.clone(), value.to_string());
                }
            }
        }
        rows.push(row);
    }

    Ok(ParsedFile { headers, rows })
}

/// Parse the first sheet of an Excel/ODS workbook.
pub fn parse_workbook(path: &Path) -> Result<ParsedFile, ParseError> {
    use calamine::{open_workbook_auto, Reader};

    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = sheet_names.first().ok_or(ParseError::NoSheets)?.clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(calamine::Error::from)?;

    let mut cells = range.rows();
    let header_row = cells
        .next()
        .ok_or_else(|| ParseError::EmptySheet(sheet_name.clone()))?;

    let headers: Vec<String> = header_row
        .iter()
        .map(|c| cell_to_string(c).unwrap_or_default())
        .collect();

    let mut rows = Vec::new();
    for data_row in cells {
        let mut row = RawRow::new();
        for (col, cell) in data_row.iter().enumerate() {
            let Some(header) = headers.get(col) else {
                continue;
            };
            if header.is_empty() {
                continue;
            }
            if let Some(value) = cell_to_string(cell) {
                row.insert(header.clone(), value);
            }
        }
        rows.push(row);
    }

    Ok(ParsedFile { headers, rows })
}

/// Render a workbook cell as trimmed text; None for blank/error cells.
fn cell_to_string(cell: &calamine::Data) -> Option<String> {
    use calamine::Data;

    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        // Spreadsheets store ids like serial numbers as floats; keep
        // whole numbers free of a trailing ".0"
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(d) => d.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_csv_with_blank_cells_absent() {
        let file = write_csv("Serial Number,Asset Tag,Item\nS1,,Laptop\n,T2,Monitor\n");
        let parsed = parse_csv(file.path()).unwrap();

        assert_eq!(parsed.headers, vec!["Serial Number", "Asset Tag", "Item"]);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].get("Serial Number").unwrap(), "S1");
        assert!(!parsed.rows[0].contains_key("Asset Tag"));
        assert_eq!(parsed.rows[1].get("Asset Tag").unwrap(), "T2");
    }

    #[test]
    fn handles_ragged_rows() {
        let file = write_csv("a,b,c\n1,2\n");
        let parsed = parse_csv(file.path()).unwrap();
        assert_eq!(parsed.rows[0].len(), 2);
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = parse_file(Path::new("assets.pdf")).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedExtension(_)));
    }
}
