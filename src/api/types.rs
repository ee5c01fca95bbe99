//! Wire types for the inventory backend

use serde::{Deserialize, Serialize};

/// One asset in the bulk-create request. Bookkeeping fields from the
/// grouping pass (asset key, source rows) never appear here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_reference_num: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_reference_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub peripherals: Vec<PeripheralPayload>,
}

/// One peripheral within an asset payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeripheralPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peripheral_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_code: Option<String>,
}

/// Per-record outcome within a bulk-create response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordResult {
    pub asset_id: Option<String>,
    pub serial_number: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

/// Bulk-create response. All four counts are independent and all are
/// surfaced to the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkCreateResponse {
    pub success: bool,
    pub imported: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
    pub warnings: Vec<String>,
    pub results: Vec<RecordResult>,
}

/// Reference-data values the import would create, reported by the
/// pre-check endpoint. Informational only; never blocks an import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewOptionsReport {
    pub categories: Vec<String>,
    pub models: Vec<String>,
    pub software: Vec<String>,
    pub windows: Vec<String>,
    pub office: Vec<String>,
}

impl NewOptionsReport {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.models.is_empty()
            && self.software.is_empty()
            && self.windows.is_empty()
            && self.office.is_empty()
    }

    /// (label, values) pairs for display, non-empty sections only.
    pub fn sections(&self) -> Vec<(&'static str, &[String])> {
        [
            ("Categories", &self.categories),
            ("Models", &self.models),
            ("Software", &self.software),
            ("Windows", &self.windows),
            ("Office", &self.office),
        ]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(label, values)| (label, values.as_slice()))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_tolerates_missing_fields() {
        let resp: BulkCreateResponse = serde_json::from_str(r#"{"imported": 3}"#).unwrap();
        assert_eq!(resp.imported, 3);
        assert_eq!(resp.failed, 0);
        assert!(resp.results.is_empty());
    }

    #[test]
    fn payload_omits_absent_fields() {
        let payload = AssetPayload {
            serial_number: Some("S1".into()),
            ..AssetPayload::default()
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"serial_number":"S1"}"#);
    }
}
