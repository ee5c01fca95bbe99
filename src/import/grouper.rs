//! Asset grouper - merges spreadsheet rows that describe one physical asset
//!
//! Warehouse exports commonly repeat an asset once per peripheral (one line
//! for the laptop + mouse, another for the laptop + keyboard). The grouper
//! derives a deterministic identity key per row, folds rows sharing a key
//! into one record with a consolidated peripherals list, and records
//! cross-row disagreements as conflicts without ever overwriting the first
//! value seen.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};

use crate::api::types::{AssetPayload, PeripheralPayload};
use crate::core::fields::{CanonicalField, CORE_ASSET_FIELDS, PERIPHERAL_FIELDS};
use crate::import::mapper::CanonicalRow;

/// An accessory attached to an asset. Either side may be missing when the
/// source cell lists mismatched name/serial counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Peripheral {
    pub name: Option<String>,
    pub serial_code: Option<String>,
    /// 1-based data line the record came from
    pub source_row: usize,
}

/// One physical asset consolidated from one or more rows.
#[derive(Debug, Clone)]
pub struct AssetGroup {
    pub asset_key: String,
    pub values: BTreeMap<CanonicalField, String>,
    pub extra: BTreeMap<String, String>,
    pub peripherals: Vec<Peripheral>,
    pub source_rows: Vec<usize>,
}

impl AssetGroup {
    /// Wrap a single row as its own group. Used on the ungrouped path so
    /// validation and payload building see one shape.
    pub fn from_row(row: &CanonicalRow) -> Self {
        let mut values = BTreeMap::new();
        for field in CORE_ASSET_FIELDS {
            if let Some(value) = row.get(field) {
                values.insert(field, value.to_string());
            }
        }
        AssetGroup {
            asset_key: generate_asset_key(row),
            values,
            extra: row.extra.clone(),
            peripherals: extract_peripherals(row),
            source_rows: vec![row.source_row],
        }
    }

    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.values.get(&field).map(|s| s.as_str())
    }

    /// First source row, for error reporting and failed-record export.
    pub fn primary_row(&self) -> usize {
        self.source_rows.first().copied().unwrap_or(0)
    }
}

/// A disagreement between two rows sharing an asset key. The stored group
/// value is never overwritten; the later value is only recorded here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub asset_key: String,
    pub field: CanonicalField,
    pub existing_value: String,
    pub new_value: String,
    pub existing_rows: Vec<usize>,
    pub conflict_row: usize,
}

/// Read-only report on a grouping pass.
#[derive(Debug, Clone, Default)]
pub struct GroupingSummary {
    pub total_rows: usize,
    pub unique_assets: usize,
    pub rows_merged: usize,
    pub peripheral_count: usize,
    pub conflict_count: usize,
}

/// Output of [`group_assets`].
#[derive(Debug, Clone, Default)]
pub struct GroupingResult {
    pub groups: Vec<AssetGroup>,
    pub conflicts: Vec<Conflict>,
    pub total_rows: usize,
}

impl GroupingResult {
    pub fn summary(&self) -> GroupingSummary {
        GroupingSummary {
            total_rows: self.total_rows,
            unique_assets: self.groups.len(),
            rows_merged: self.total_rows.saturating_sub(self.groups.len()),
            peripheral_count: self.groups.iter().map(|g| g.peripherals.len()).sum(),
            conflict_count: self.conflicts.len(),
        }
    }
}

fn normalize_part(value: &str) -> String {
    value.trim().to_lowercase()
}

fn non_blank(row: &CanonicalRow, field: CanonicalField) -> Option<&str> {
    row.get(field).filter(|v| !v.trim().is_empty())
}

/// Derive the identity key for a row. Total and deterministic: identical
/// field values always yield the identical key, and every row gets one.
///
/// Priority: serial number, then tag, then project-reference + item-name
/// composite, then a hash of all core field values. The tiers are
/// namespaced so a tag value can never collide with a serial-derived key.
pub fn generate_asset_key(row: &CanonicalRow) -> String {
    if let Some(serial) = non_blank(row, CanonicalField::SerialNumber) {
        return format!("serial:{}", normalize_part(serial));
    }
    if let Some(tag) = non_blank(row, CanonicalField::TagId) {
        return format!("tag:{}", normalize_part(tag));
    }

    let project = non_blank(row, CanonicalField::ProjectReferenceNum);
    let item = non_blank(row, CanonicalField::ItemName);
    if project.is_some() || item.is_some() {
        return format!(
            "ref:{}/{}",
            normalize_part(project.unwrap_or_default()),
            normalize_part(item.unwrap_or_default())
        );
    }

    let mut hasher = Sha256::new();
    for field in CORE_ASSET_FIELDS {
        hasher.update(normalize_part(row.get(field).unwrap_or_default()));
        hasher.update([0x1f]);
    }
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(16);
    for byte in &digest[..8] {
        hex.push_str(&format!("{:02x}", byte));
    }
    format!("hash:{}", hex)
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Expand a row's peripheral cells into records. Both cells may hold
/// comma-separated lists; they are split independently and zipped by
/// position up to the longer list. Mismatched counts yield partially
/// populated records rather than an error.
pub fn extract_peripherals(row: &CanonicalRow) -> Vec<Peripheral> {
    let names = split_list(row.get(CanonicalField::PeripheralName));
    let codes = split_list(row.get(CanonicalField::SerialCode));

    let count = names.len().max(codes.len());
    (0..count)
        .map(|i| Peripheral {
            name: names.get(i).cloned(),
            serial_code: codes.get(i).cloned(),
            source_row: row.source_row,
        })
        .collect()
}

/// Core-field disagreements between an existing group and a new row.
/// Case-insensitive comparison; only fields present and non-empty on both
/// sides can conflict.
fn detect_conflicts(group: &AssetGroup, row: &CanonicalRow) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for field in CORE_ASSET_FIELDS {
        let (Some(existing), Some(incoming)) = (group.get(field), non_blank(row, field)) else {
            continue;
        };
        if existing.trim().is_empty() {
            continue;
        }
        if !existing.trim().eq_ignore_ascii_case(incoming.trim()) {
            conflicts.push(Conflict {
                asset_key: group.asset_key.clone(),
                field,
                existing_value: existing.to_string(),
                new_value: incoming.to_string(),
                existing_rows: group.source_rows.clone(),
                conflict_row: row.source_row,
            });
        }
    }
    conflicts
}

/// Single ordered pass over the rows, maintaining an insertion-ordered map
/// from asset key to group. First occurrence of a key seeds the group's core
/// data; later rows only contribute peripherals, source rows, and conflicts.
pub fn group_assets(rows: &[CanonicalRow]) -> GroupingResult {
    let mut groups: Vec<AssetGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut conflicts = Vec::new();

    for row in rows {
        let key = generate_asset_key(row);
        match index.get(&key) {
            None => {
                index.insert(key, groups.len());
                groups.push(AssetGroup::from_row(row));
            }
            Some(&slot) => {
                let group = &mut groups[slot];
                conflicts.extend(detect_conflicts(group, row));
                group.peripherals.extend(extract_peripherals(row));
                group.source_rows.push(row.source_row);
            }
        }
    }

    GroupingResult {
        total_rows: rows.len(),
        groups,
        conflicts,
    }
}

fn has_peripheral_data(row: &CanonicalRow) -> bool {
    PERIPHERAL_FIELDS
        .iter()
        .any(|f| non_blank(row, *f).is_some())
}

/// Global heuristic deciding whether the dataset needs a grouping review.
///
/// Counts rows per normalized serial number and per tag; the duplicate rate
/// is the larger duplicate-row count over the total. Review triggers when
/// the rate exceeds `threshold`, or when any duplicate key exists and any
/// row anywhere carries peripheral data. Unrelated duplicate identifiers can
/// therefore trigger review even with no peripherals present.
pub fn needs_grouping(rows: &[CanonicalRow], threshold: f64) -> bool {
    if rows.is_empty() {
        return false;
    }

    let mut serial_counts: HashMap<String, usize> = HashMap::new();
    let mut tag_counts: HashMap<String, usize> = HashMap::new();
    for row in rows {
        if let Some(serial) = non_blank(row, CanonicalField::SerialNumber) {
            *serial_counts.entry(normalize_part(serial)).or_insert(0) += 1;
        }
        if let Some(tag) = non_blank(row, CanonicalField::TagId) {
            *tag_counts.entry(normalize_part(tag)).or_insert(0) += 1;
        }
    }

    let duplicate_rows = |counts: &HashMap<String, usize>| -> usize {
        counts.values().filter(|&&c| c > 1).sum()
    };
    let duplicate_serial_rows = duplicate_rows(&serial_counts);
    let duplicate_tag_rows = duplicate_rows(&tag_counts);

    let duplicate_rate =
        duplicate_serial_rows.max(duplicate_tag_rows) as f64 / rows.len() as f64;
    if duplicate_rate > threshold {
        return true;
    }

    let any_duplicate = duplicate_serial_rows > 0 || duplicate_tag_rows > 0;
    any_duplicate && rows.iter().any(has_peripheral_data)
}

/// Strip bookkeeping (asset key, source rows, per-peripheral source row)
/// and produce the backend payload shape.
pub fn transform_for_backend(groups: &[AssetGroup]) -> Vec<AssetPayload> {
    groups
        .iter()
        .map(|group| {
            let field = |f: CanonicalField| group.get(f).map(|v| v.to_string());
            AssetPayload {
                serial_number: field(CanonicalField::SerialNumber),
                tag_id: field(CanonicalField::TagId),
                project_reference_num: field(CanonicalField::ProjectReferenceNum),
                category: field(CanonicalField::Category),
                model: field(CanonicalField::Model),
                status: field(CanonicalField::Status),
                recipient_name: field(CanonicalField::RecipientName),
                department_name: field(CanonicalField::DepartmentName),
                customer_name: field(CanonicalField::CustomerName),
                customer_reference_number: field(CanonicalField::CustomerReferenceNumber),
                branch: field(CanonicalField::Branch),
                item_name: field(CanonicalField::ItemName),
                remarks: field(CanonicalField::Remarks),
                peripherals: group
                    .peripherals
                    .iter()
                    .map(|p| PeripheralPayload {
                        peripheral_name: p.name.clone(),
                        serial_code: p.serial_code.clone(),
                    })
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(source_row: usize, pairs: &[(CanonicalField, &str)]) -> CanonicalRow {
        let mut r = CanonicalRow {
            source_row,
            ..CanonicalRow::default()
        };
        for (field, value) in pairs {
            r.set(*field, *value);
        }
        r
    }

    #[test]
    fn asset_key_priority_order() {
        let by_serial = row(1, &[
            (CanonicalField::SerialNumber, " SN-100 "),
            (CanonicalField::TagId, "T1"),
        ]);
        assert_eq!(generate_asset_key(&by_serial), "serial:sn-100");

        let by_tag = row(1, &[(CanonicalField::TagId, "T1")]);
        assert_eq!(generate_asset_key(&by_tag), "tag:t1");

        let by_ref = row(1, &[
            (CanonicalField::ProjectReferenceNum, "P-9"),
            (CanonicalField::ItemName, "Laptop"),
        ]);
        assert_eq!(generate_asset_key(&by_ref), "ref:p-9/laptop");
    }

    #[test]
    fn asset_key_is_total_and_deterministic() {
        let sparse = row(1, &[(CanonicalField::Remarks, "no identifiers at all")]);
        let key = generate_asset_key(&sparse);
        assert!(key.starts_with("hash:"));
        assert!(key.len() > "hash:".len());
        assert_eq!(key, generate_asset_key(&sparse));

        // Even a completely empty row yields a key
        let empty = CanonicalRow::default();
        assert!(generate_asset_key(&empty).starts_with("hash:"));
    }

    #[test]
    fn extract_peripherals_zips_positionally() {
        let r = row(3, &[
            (CanonicalField::PeripheralName, "Mouse, Keyboard, Cable"),
            (CanonicalField::SerialCode, "M1, K1"),
        ]);
        let peripherals = extract_peripherals(&r);
        assert_eq!(peripherals.len(), 3);
        assert_eq!(peripherals[0].name.as_deref(), Some("Mouse"));
        assert_eq!(peripherals[0].serial_code.as_deref(), Some("M1"));
        assert_eq!(peripherals[2].name.as_deref(), Some("Cable"));
        assert_eq!(peripherals[2].serial_code, None);
        assert!(peripherals.iter().all(|p| p.source_row == 3));

        // More codes than names: trailing records carry only a code
        let r = row(4, &[
            (CanonicalField::PeripheralName, "Dock"),
            (CanonicalField::SerialCode, "D1,D2"),
        ]);
        let peripherals = extract_peripherals(&r);
        assert_eq!(peripherals.len(), 2);
        assert_eq!(peripherals[1].name, None);
        assert_eq!(peripherals[1].serial_code.as_deref(), Some("D2"));
    }

    #[test]
    fn rows_sharing_a_serial_merge_into_one_group() {
        let rows = vec![
            row(1, &[
                (CanonicalField::SerialNumber, "S1"),
                (CanonicalField::TagId, "T1"),
                (CanonicalField::PeripheralName, "Mouse"),
                (CanonicalField::SerialCode, "M1"),
            ]),
            row(2, &[
                (CanonicalField::SerialNumber, "S1"),
                (CanonicalField::TagId, "T1"),
                (CanonicalField::PeripheralName, "Keyboard"),
                (CanonicalField::SerialCode, "K1"),
            ]),
        ];
        let result = group_assets(&rows);

        assert_eq!(result.groups.len(), 1);
        assert!(result.conflicts.is_empty());
        let group = &result.groups[0];
        assert_eq!(group.source_rows, vec![1, 2]);
        let names: Vec<_> = group.peripherals.iter().map(|p| p.name.as_deref()).collect();
        assert_eq!(names, vec![Some("Mouse"), Some("Keyboard")]);
        let codes: Vec<_> = group
            .peripherals
            .iter()
            .map(|p| p.serial_code.as_deref())
            .collect();
        assert_eq!(codes, vec![Some("M1"), Some("K1")]);
    }

    #[test]
    fn disagreeing_core_field_becomes_conflict_first_value_kept() {
        let rows = vec![
            row(1, &[
                (CanonicalField::SerialNumber, "S1"),
                (CanonicalField::TagId, "T1"),
            ]),
            row(2, &[
                (CanonicalField::SerialNumber, "S1"),
                (CanonicalField::TagId, "T2"),
            ]),
        ];
        let result = group_assets(&rows);

        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].get(CanonicalField::TagId), Some("T1"));
        assert_eq!(
            result.conflicts,
            vec![Conflict {
                asset_key: "serial:s1".to_string(),
                field: CanonicalField::TagId,
                existing_value: "T1".to_string(),
                new_value: "T2".to_string(),
                existing_rows: vec![1],
                conflict_row: 2,
            }]
        );
    }

    #[test]
    fn case_differences_are_not_conflicts() {
        let rows = vec![
            row(1, &[
                (CanonicalField::SerialNumber, "S1"),
                (CanonicalField::Category, "Laptop"),
            ]),
            row(2, &[
                (CanonicalField::SerialNumber, "S1"),
                (CanonicalField::Category, "LAPTOP"),
            ]),
        ];
        assert!(group_assets(&rows).conflicts.is_empty());
    }

    #[test]
    fn later_rows_contribute_only_peripherals_and_source_rows() {
        let rows = vec![
            row(1, &[(CanonicalField::SerialNumber, "S1")]),
            row(2, &[
                (CanonicalField::SerialNumber, "S1"),
                (CanonicalField::Model, "X230"),
                (CanonicalField::PeripheralName, "Dock"),
                (CanonicalField::SerialCode, "D1"),
            ]),
        ];
        let result = group_assets(&rows);

        // The seed row owns the core data; a value only a later row has is
        // not merged in and, with nothing to disagree with, is no conflict
        assert_eq!(result.groups[0].get(CanonicalField::Model), None);
        assert!(result.conflicts.is_empty());
        assert_eq!(result.groups[0].source_rows, vec![1, 2]);
        assert_eq!(result.groups[0].peripherals.len(), 1);
    }

    #[test]
    fn reordering_rows_preserves_peripheral_and_conflict_sets() {
        let a = row(1, &[
            (CanonicalField::SerialNumber, "S1"),
            (CanonicalField::TagId, "T1"),
            (CanonicalField::PeripheralName, "Mouse"),
        ]);
        let b = row(2, &[
            (CanonicalField::SerialNumber, "S1"),
            (CanonicalField::TagId, "T2"),
            (CanonicalField::PeripheralName, "Keyboard"),
        ]);

        let forward = group_assets(&[a.clone(), b.clone()]);
        let mut b2 = b;
        b2.source_row = 1;
        let mut a2 = a;
        a2.source_row = 2;
        let reversed = group_assets(&[b2, a2]);

        let names = |r: &GroupingResult| {
            let mut v: Vec<String> = r.groups[0]
                .peripherals
                .iter()
                .filter_map(|p| p.name.clone())
                .collect();
            v.sort();
            v
        };
        assert_eq!(names(&forward), names(&reversed));
        assert_eq!(forward.conflicts.len(), reversed.conflicts.len());

        // But the authoritative value follows input order
        assert_eq!(forward.groups[0].get(CanonicalField::TagId), Some("T1"));
        assert_eq!(reversed.groups[0].get(CanonicalField::TagId), Some("T2"));
    }

    #[test]
    fn heavily_duplicated_dataset_triggers_grouping() {
        // 100 rows over 3 serials, peripheral columns populated
        let mut rows = Vec::new();
        for i in 0..100 {
            rows.push(row(i + 1, &[
                (CanonicalField::SerialNumber, ["S1", "S2", "S3"][i % 3]),
                (CanonicalField::PeripheralName, "Mouse"),
            ]));
        }
        assert!(needs_grouping(&rows, 0.05));
    }

    #[test]
    fn duplicate_tags_without_peripherals_can_still_trigger() {
        // Duplicate rate above threshold, no peripheral data anywhere
        let rows = vec![
            row(1, &[(CanonicalField::TagId, "T1")]),
            row(2, &[(CanonicalField::TagId, "T1")]),
            row(3, &[(CanonicalField::TagId, "T2")]),
        ];
        assert!(needs_grouping(&rows, 0.05));
    }

    #[test]
    fn unique_rows_do_not_trigger_grouping() {
        let rows = vec![
            row(1, &[(CanonicalField::SerialNumber, "S1")]),
            row(2, &[(CanonicalField::SerialNumber, "S2")]),
        ];
        assert!(!needs_grouping(&rows, 0.05));
        assert!(!needs_grouping(&[], 0.05));
    }

    #[test]
    fn one_duplicate_below_threshold_needs_peripheral_data() {
        // 2 duplicate rows out of 100 = 2% rate; triggers only because a
        // row somewhere carries peripheral data
        let mut rows: Vec<CanonicalRow> = (0..98)
            .map(|i| row(i + 1, &[(CanonicalField::SerialNumber, &format!("U{}", i)[..])]))
            .collect();
        rows.push(row(99, &[(CanonicalField::SerialNumber, "DUP")]));
        rows.push(row(100, &[(CanonicalField::SerialNumber, "DUP")]));

        assert!(!needs_grouping(&rows, 0.05));

        rows[0].set(CanonicalField::PeripheralName, "Cable");
        assert!(needs_grouping(&rows, 0.05));
    }

    #[test]
    fn backend_payload_strips_bookkeeping() {
        let rows = vec![
            row(1, &[
                (CanonicalField::SerialNumber, "S1"),
                (CanonicalField::ItemName, "Laptop"),
                (CanonicalField::PeripheralName, "Mouse"),
                (CanonicalField::SerialCode, "M1"),
            ]),
        ];
        let result = group_assets(&rows);
        let payloads = transform_for_backend(&result.groups);

        assert_eq!(payloads.len(), 1);
        let json = serde_json::to_value(&payloads[0]).unwrap();
        assert_eq!(json["serial_number"], "S1");
        assert_eq!(json["peripherals"][0]["peripheral_name"], "Mouse");
        assert!(json.get("asset_key").is_none());
        assert!(json.get("source_rows").is_none());
        assert!(json["peripherals"][0].get("source_row").is_none());
    }
}
