//! Failed-records export - a purely client-side CSV derivation
//!
//! Zips the originally parsed rows with their validation error messages so
//! the user can fix and re-upload just the failures. No server round trip.

use std::path::Path;
use thiserror::Error;

use crate::import::parser::ParsedFile;
use crate::import::validator::ValidationSummary;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Write every failing source row to `path` with its original cells plus a
/// trailing `errors` column. Returns the number of rows written.
pub fn write_failed_records(
    file: &ParsedFile,
    summary: &ValidationSummary,
    path: &Path,
) -> Result<usize, ExportError> {
    let wrap = |source| ExportError::Write {
        path: path.display().to_string(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(wrap)?;

    let mut header = file.headers.clone();
    header.push("errors".to_string());
    writer.write_record(&header).map_err(wrap)?;

    let mut written = 0;
    for row_errors in &summary.errors {
        // Rows are 1-based over data lines; a grouped record points at its
        // first source row
        let Some(raw) = row_errors.row.checked_sub(1).and_then(|i| file.rows.get(i)) else {
            continue;
        };

        let mut record: Vec<String> = file
            .headers
            .iter()
            .map(|h| raw.get(h).cloned().unwrap_or_default())
            .collect();
        let messages: Vec<String> = row_errors
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        record.push(messages.join("; "));

        writer.write_record(&record).map_err(wrap)?;
        written += 1;
    }

    writer.flush().map_err(|e| wrap(csv::Error::from(e)))?;
    Ok(written)
}
