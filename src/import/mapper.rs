//! Header mapper - reconciles arbitrary spreadsheet headers to the
//! canonical field vocabulary
//!
//! Matching is two-pass: an exact match against each field's known variant
//! spellings (after normalization), then a substring keyword fallback tried
//! in field declaration order. First match wins in both passes, so fields
//! with overlapping keywords (`serial_number` vs `serial_code` on "serial")
//! resolve by declaration order, not relevance. That ordering is part of the
//! contract; see [`CanonicalField`].

use std::collections::BTreeMap;

use crate::core::fields::{CanonicalField, REQUIRED_FIELDS};
use crate::import::parser::ParsedFile;

/// Result of reconciling a file's headers against the vocabulary.
#[derive(Debug, Clone, Default)]
pub struct HeaderMapping {
    /// raw header -> canonical field, in file header order
    pub mapping: Vec<(String, CanonicalField)>,
    /// Headers with no match; passed through unchanged by transform
    pub unmapped: Vec<String>,
    /// Canonical fields claimed by more than one raw header
    pub duplicates: Vec<CanonicalField>,
}

impl HeaderMapping {
    /// Canonical field a raw header resolved to, if any.
    pub fn get(&self, raw: &str) -> Option<CanonicalField> {
        self.mapping
            .iter()
            .find(|(header, _)| header == raw)
            .map(|(_, field)| *field)
    }

    /// Fields that appear among the mapped values.
    pub fn mapped_fields(&self) -> Vec<CanonicalField> {
        let mut fields: Vec<CanonicalField> =
            self.mapping.iter().map(|(_, field)| *field).collect();
        fields.sort();
        fields.dedup();
        fields
    }

    /// Bind a raw header to a field, replacing any previous binding for
    /// that header. Used by the review step when the user corrects the
    /// mapping by hand. Recomputes unmapped/duplicates bookkeeping.
    pub fn assign(&mut self, raw: &str, field: CanonicalField) {
        self.mapping.retain(|(header, _)| header != raw);
        self.mapping.push((raw.to_string(), field));
        self.unmapped.retain(|header| header != raw);
        self.recompute_duplicates();
    }

    fn recompute_duplicates(&mut self) {
        self.duplicates = CanonicalField::ALL
            .iter()
            .copied()
            .filter(|f| self.mapping.iter().filter(|(_, m)| m == f).count() > 1)
            .collect();
    }
}

/// Outcome of [`validate_mapping`].
#[derive(Debug, Clone)]
pub struct MappingValidation {
    pub is_valid: bool,
    pub missing_required: Vec<CanonicalField>,
}

/// A spreadsheet row rewritten into canonical shape. Unrecognized headers
/// are preserved verbatim in `extra` rather than dropped.
#[derive(Debug, Clone, Default)]
pub struct CanonicalRow {
    pub values: BTreeMap<CanonicalField, String>,
    pub extra: BTreeMap<String, String>,
    /// 1-based position among the file's data lines
    pub source_row: usize,
}

impl CanonicalRow {
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.values.get(&field).map(|s| s.as_str())
    }

    pub fn set(&mut self, field: CanonicalField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }
}

/// Lowercase a header and strip everything that is not alphanumeric.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Resolve one header to a canonical field: exact variant match across all
/// fields first, then keyword substring fallback in declaration order.
pub fn match_header(header: &str) -> Option<CanonicalField> {
    let normalized = normalize_header(header);
    if normalized.is_empty() {
        return None;
    }

    for field in CanonicalField::ALL {
        if field
            .variants()
            .iter()
            .any(|v| normalize_header(v) == normalized)
        {
            return Some(field);
        }
    }

    for field in CanonicalField::ALL {
        if field.keywords().iter().any(|k| normalized.contains(k)) {
            return Some(field);
        }
    }

    None
}

/// Build the raw->canonical mapping for a header row, tracking headers with
/// no match and canonical fields claimed more than once.
pub fn map_headers(headers: &[String]) -> HeaderMapping {
    let mut result = HeaderMapping::default();

    for header in headers {
        match match_header(header) {
            Some(field) => result.mapping.push((header.clone(), field)),
            None => result.unmapped.push(header.clone()),
        }
    }
    result.recompute_duplicates();

    result
}

/// A mapping is valid iff every required field appears among the mapped
/// values. Unmapped extras and duplicate bindings do not affect validity.
pub fn validate_mapping(mapping: &HeaderMapping) -> MappingValidation {
    let mapped = mapping.mapped_fields();
    let missing_required: Vec<CanonicalField> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|f| !mapped.contains(f))
        .collect();

    MappingValidation {
        is_valid: missing_required.is_empty(),
        missing_required,
    }
}

/// Whether the pipeline must pause for human confirmation of the mapping.
pub fn needs_review(mapping: &HeaderMapping, validation: &MappingValidation) -> bool {
    !validation.is_valid || !mapping.unmapped.is_empty() || !mapping.duplicates.is_empty()
}

/// Rewrite each row's keys through the mapping. Headers with no mapping are
/// kept under their original key. When two raw headers claim the same field
/// the first one in file order wins; the loser's value is dropped from the
/// canonical side but still reported via `duplicates`.
pub fn transform_data(file: &ParsedFile, mapping: &HeaderMapping) -> Vec<CanonicalRow> {
    file.rows
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let mut row = CanonicalRow {
                source_row: idx + 1,
                ..CanonicalRow::default()
            };
            for header in &file.headers {
                let Some(value) = raw.get(header) else {
                    continue;
                };
                match mapping.get(header) {
                    Some(field) => {
                        row.values.entry(field).or_insert_with(|| value.clone());
                    }
                    None => {
                        row.extra.insert(header.clone(), value.clone());
                    }
                }
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize_strips_everything_but_alphanumerics() {
        assert_eq!(normalize_header("Serial Number"), "serialnumber");
        assert_eq!(normalize_header("S/N #"), "sn");
        assert_eq!(normalize_header("  Tag-ID  "), "tagid");
    }

    #[test]
    fn maps_common_headers_to_canonical_fields() {
        // Scenario: typical export headers resolve without review
        let mapping = map_headers(&headers(&[
            "Serial Number",
            "Asset Tag",
            "Item",
            "Project Ref",
        ]));

        assert_eq!(mapping.get("Serial Number"), Some(CanonicalField::SerialNumber));
        assert_eq!(mapping.get("Asset Tag"), Some(CanonicalField::TagId));
        assert_eq!(mapping.get("Item"), Some(CanonicalField::ItemName));
        assert_eq!(
            mapping.get("Project Ref"),
            Some(CanonicalField::ProjectReferenceNum)
        );
        assert!(mapping.unmapped.is_empty());
        assert!(mapping.duplicates.is_empty());
        assert!(validate_mapping(&mapping).is_valid);
    }

    #[test]
    fn bare_serial_keyword_resolves_to_serial_number_by_order() {
        // "serial" matches both serial_number and serial_code keywords;
        // declaration order decides
        assert_eq!(
            match_header("Device Serial"),
            Some(CanonicalField::SerialNumber)
        );
        // An explicit peripheral spelling still reaches serial_code via
        // its exact variant list
        assert_eq!(
            match_header("Peripheral Serial"),
            Some(CanonicalField::SerialCode)
        );
    }

    #[test]
    fn unknown_headers_are_tracked_not_dropped() {
        let mapping = map_headers(&headers(&["Serial Number", "Warranty Until"]));
        assert_eq!(mapping.unmapped, vec!["Warranty Until".to_string()]);
    }

    #[test]
    fn duplicate_bindings_are_reported() {
        let mapping = map_headers(&headers(&["Serial Number", "Serial No"]));
        assert_eq!(mapping.duplicates, vec![CanonicalField::SerialNumber]);
        // Duplicates alone do not invalidate the mapping
        let validation = validate_mapping(&mapping);
        assert!(!validation.missing_required.contains(&CanonicalField::SerialNumber));
    }

    #[test]
    fn validation_requires_all_four_fields() {
        let mapping = map_headers(&headers(&["Serial Number", "Asset Tag", "Item"]));
        let validation = validate_mapping(&mapping);
        assert!(!validation.is_valid);
        assert_eq!(
            validation.missing_required,
            vec![CanonicalField::ProjectReferenceNum]
        );
    }

    #[test]
    fn transform_rewrites_keys_and_passes_unknown_through() {
        let file = ParsedFile {
            headers: headers(&["Serial Number", "Warranty Until"]),
            rows: vec![HashMap::from([
                ("Serial Number".to_string(), "S1".to_string()),
                ("Warranty Until".to_string(), "2027-01".to_string()),
            ])],
        };
        let mapping = map_headers(&file.headers);
        let rows = transform_data(&file, &mapping);

        assert_eq!(rows[0].get(CanonicalField::SerialNumber), Some("S1"));
        assert_eq!(rows[0].extra.get("Warranty Until").unwrap(), "2027-01");
        assert_eq!(rows[0].source_row, 1);
    }

    #[test]
    fn transform_first_header_wins_on_duplicate_binding() {
        let file = ParsedFile {
            headers: headers(&["Serial Number", "Serial No"]),
            rows: vec![HashMap::from([
                ("Serial Number".to_string(), "S1".to_string()),
                ("Serial No".to_string(), "S2".to_string()),
            ])],
        };
        let mapping = map_headers(&file.headers);
        let rows = transform_data(&file, &mapping);
        assert_eq!(rows[0].get(CanonicalField::SerialNumber), Some("S1"));
    }

    #[test]
    fn assign_fixes_a_missing_required_field() {
        let mut mapping = map_headers(&headers(&["Serial Number", "Asset Tag", "Item", "PRN"]));
        assert!(!validate_mapping(&mapping).is_valid);

        mapping.assign("PRN", CanonicalField::ProjectReferenceNum);
        assert!(validate_mapping(&mapping).is_valid);
        assert!(mapping.unmapped.is_empty());
    }
}
