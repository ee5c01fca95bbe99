//! Record validation - required fields, uniqueness, enumerations, formats,
//! and peripheral completeness

use std::collections::HashMap;
use std::str::FromStr;

use crate::core::fields::{AssetStatus, CanonicalField, REQUIRED_FIELDS};
use crate::import::grouper::AssetGroup;

/// One problem on one record, pointed at a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field path, e.g. `serial_number` or `peripherals[2].serial_code`
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors for one record, tagged with its source row for traceability.
#[derive(Debug, Clone)]
pub struct RowErrors {
    /// 1-based source data line (first source row for grouped records)
    pub row: usize,
    pub errors: Vec<ValidationError>,
}

/// How many failing rows the interactive preview shows. The full error
/// list is always retained for the failed-records export.
pub const ERROR_PREVIEW_LIMIT: usize = 10;

/// Aggregated result over the dataset.
#[derive(Debug, Clone, Default)]
pub struct ValidationSummary {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub errors: Vec<RowErrors>,
}

impl ValidationSummary {
    pub fn is_clean(&self) -> bool {
        self.invalid_rows == 0
    }

    /// First [`ERROR_PREVIEW_LIMIT`] failing rows, for display.
    pub fn preview(&self) -> &[RowErrors] {
        let cap = self.errors.len().min(ERROR_PREVIEW_LIMIT);
        &self.errors[..cap]
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Serial numbers allow ASCII letters, digits, hyphen, and underscore.
fn is_valid_serial(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Occurrence counts of serials and tags across the dataset, used for the
/// ungrouped uniqueness check.
struct UniquenessIndex {
    serials: HashMap<String, usize>,
    tags: HashMap<String, usize>,
}

impl UniquenessIndex {
    fn build(groups: &[AssetGroup]) -> Self {
        let mut serials = HashMap::new();
        let mut tags = HashMap::new();
        for group in groups {
            if let Some(serial) = group.get(CanonicalField::SerialNumber) {
                *serials.entry(normalize(serial)).or_insert(0) += 1;
            }
            if let Some(tag) = group.get(CanonicalField::TagId) {
                *tags.entry(normalize(tag)).or_insert(0) += 1;
            }
        }
        Self { serials, tags }
    }
}

/// Validate every record, returning an error list parallel to the input.
///
/// `is_grouped` marks data that already went through asset grouping; the
/// serial/tag uniqueness check is skipped for it, since grouping has
/// already merged rows by asset identity and re-flagging the survivors
/// would be a false positive.
///
/// Side effect: a status value that case-insensitively matches a known
/// status is rewritten to the canonical casing.
pub fn validate_data(groups: &mut [AssetGroup], is_grouped: bool) -> Vec<Vec<ValidationError>> {
    let uniqueness = if is_grouped {
        None
    } else {
        Some(UniquenessIndex::build(groups))
    };

    groups
        .iter_mut()
        .map(|group| {
            let mut errors = Vec::new();

            for field in REQUIRED_FIELDS {
                let missing = group
                    .get(field)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true);
                if missing {
                    errors.push(ValidationError::new(
                        field.as_str(),
                        format!("Missing required field '{}'", field),
                    ));
                }
            }

            if let Some(index) = &uniqueness {
                if let Some(serial) = group.get(CanonicalField::SerialNumber) {
                    let count = index.serials.get(&normalize(serial)).copied().unwrap_or(0);
                    if count > 1 {
                        errors.push(ValidationError::new(
                            "serial_number",
                            format!("Duplicate serial_number '{}' appears {} times", serial, count),
                        ));
                    }
                }
                if let Some(tag) = group.get(CanonicalField::TagId) {
                    let count = index.tags.get(&normalize(tag)).copied().unwrap_or(0);
                    if count > 1 {
                        errors.push(ValidationError::new(
                            "tag_id",
                            format!("Duplicate tag_id '{}' appears {} times", tag, count),
                        ));
                    }
                }
            }

            if let Some(status) = group.get(CanonicalField::Status) {
                match AssetStatus::from_str(status) {
                    Ok(parsed) => {
                        group.values.insert(CanonicalField::Status, parsed.to_string());
                    }
                    Err(_) => {
                        errors.push(ValidationError::new(
                            "status",
                            format!(
                                "Invalid status '{}' (expected one of: Active, Inactive, Maintenance)",
                                status
                            ),
                        ));
                    }
                }
            }

            if let Some(serial) = group.get(CanonicalField::SerialNumber) {
                if !serial.trim().is_empty() && !is_valid_serial(serial.trim()) {
                    errors.push(ValidationError::new(
                        "serial_number",
                        format!(
                            "Serial number '{}' may only contain letters, digits, '-' and '_'",
                            serial
                        ),
                    ));
                }
            }

            for (i, peripheral) in group.peripherals.iter().enumerate() {
                let has_name = peripheral
                    .name
                    .as_deref()
                    .map(|n| !n.trim().is_empty())
                    .unwrap_or(false);
                let has_code = peripheral
                    .serial_code
                    .as_deref()
                    .map(|c| !c.trim().is_empty())
                    .unwrap_or(false);
                if has_name && !has_code {
                    errors.push(ValidationError::new(
                        format!("peripherals[{}].serial_code", i),
                        format!(
                            "Peripheral '{}' (row {}) has no serial code",
                            peripheral.name.as_deref().unwrap_or(""),
                            peripheral.source_row
                        ),
                    ));
                }
            }

            errors
        })
        .collect()
}

/// Fold per-record errors into a summary, tagging each failing record with
/// its primary source row.
pub fn summarize(groups: &[AssetGroup], errors: &[Vec<ValidationError>]) -> ValidationSummary {
    let mut summary = ValidationSummary {
        total_rows: groups.len(),
        ..ValidationSummary::default()
    };

    for (group, record_errors) in groups.iter().zip(errors) {
        if record_errors.is_empty() {
            summary.valid_rows += 1;
        } else {
            summary.invalid_rows += 1;
            summary.errors.push(RowErrors {
                row: group.primary_row(),
                errors: record_errors.clone(),
            });
        }
    }

    summary
}
