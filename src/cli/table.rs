//! Table rendering for review and preview output

use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::import::grouper::Conflict;
use crate::import::mapper::HeaderMapping;
use crate::import::validator::ValidationSummary;

/// Spreadsheet header -> canonical field table, unmapped headers included.
pub fn mapping_table(mapping: &HeaderMapping) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Spreadsheet Header", "Canonical Field"]);

    for (raw, field) in &mapping.mapping {
        builder.push_record([truncate_str(raw, 40), field.to_string()]);
    }
    for raw in &mapping.unmapped {
        builder.push_record([truncate_str(raw, 40), "(kept as-is)".to_string()]);
    }

    builder.build().with(Style::markdown()).to_string()
}

/// Cross-row disagreements, first `limit` shown.
pub fn conflicts_table(conflicts: &[Conflict], limit: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Kept (first value)", "Conflicting", "Rows"]);

    for conflict in conflicts.iter().take(limit) {
        builder.push_record([
            conflict.field.to_string(),
            truncate_str(&conflict.existing_value, 24),
            truncate_str(&conflict.new_value, 24),
            format!(
                "{:?} vs {}",
                conflict.existing_rows, conflict.conflict_row
            ),
        ]);
    }

    let mut table = builder.build().with(Style::markdown()).to_string();
    if conflicts.len() > limit {
        table.push_str(&format!("\n... and {} more", conflicts.len() - limit));
    }
    table
}

/// Failing rows with their error messages, preview-capped by the summary.
pub fn errors_table(summary: &ValidationSummary) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Row", "Field", "Problem"]);

    for row_errors in summary.preview() {
        for error in &row_errors.errors {
            builder.push_record([
                row_errors.row.to_string(),
                error.field.clone(),
                truncate_str(&error.message, 60),
            ]);
        }
    }

    let mut table = builder.build().with(Style::markdown()).to_string();
    let hidden = summary.errors.len().saturating_sub(summary.preview().len());
    if hidden > 0 {
        table.push_str(&format!(
            "\n... {} more failing row(s); use --export-failed to get all of them",
            hidden
        ));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::mapper::map_headers;

    #[test]
    fn mapping_table_lists_unmapped_headers() {
        let mapping = map_headers(&["Serial Number".to_string(), "Mystery".to_string()]);
        let table = mapping_table(&mapping);
        assert!(table.contains("serial_number"));
        assert!(table.contains("Mystery"));
        assert!(table.contains("(kept as-is)"));
    }
}
