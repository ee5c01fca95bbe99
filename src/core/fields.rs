//! Canonical field vocabulary for asset spreadsheets
//!
//! The vocabulary is a closed, ordered set. Declaration order is matching
//! precedence: when keyword matching is ambiguous (e.g. a header containing
//! just "serial" matches both `serial_number` and `serial_code`), the field
//! declared first claims the header. Reordering these tables changes import
//! behavior.

use serde::{Deserialize, Serialize};

/// One of the fixed canonical asset attributes.
///
/// Derived `Ord` follows declaration order, which is also the matching
/// precedence used by the header mapper.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    SerialNumber,
    TagId,
    ProjectReferenceNum,
    Category,
    Model,
    Status,
    RecipientName,
    DepartmentName,
    CustomerName,
    CustomerReferenceNumber,
    Branch,
    ItemName,
    Remarks,
    PeripheralName,
    SerialCode,
}

impl CanonicalField {
    /// All fields, in precedence order.
    pub const ALL: [CanonicalField; 15] = [
        CanonicalField::SerialNumber,
        CanonicalField::TagId,
        CanonicalField::ProjectReferenceNum,
        CanonicalField::Category,
        CanonicalField::Model,
        CanonicalField::Status,
        CanonicalField::RecipientName,
        CanonicalField::DepartmentName,
        CanonicalField::CustomerName,
        CanonicalField::CustomerReferenceNumber,
        CanonicalField::Branch,
        CanonicalField::ItemName,
        CanonicalField::Remarks,
        CanonicalField::PeripheralName,
        CanonicalField::SerialCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::SerialNumber => "serial_number",
            CanonicalField::TagId => "tag_id",
            CanonicalField::ProjectReferenceNum => "project_reference_num",
            CanonicalField::Category => "category",
            CanonicalField::Model => "model",
            CanonicalField::Status => "status",
            CanonicalField::RecipientName => "recipient_name",
            CanonicalField::DepartmentName => "department_name",
            CanonicalField::CustomerName => "customer_name",
            CanonicalField::CustomerReferenceNumber => "customer_reference_number",
            CanonicalField::Branch => "branch",
            CanonicalField::ItemName => "item_name",
            CanonicalField::Remarks => "remarks",
            CanonicalField::PeripheralName => "peripheral_name",
            CanonicalField::SerialCode => "serial_code",
        }
    }

    /// Header spellings that map to this field after normalization
    /// (lowercase, non-alphanumerics stripped). Tried exact-match first,
    /// across all fields, before any keyword fallback.
    pub fn variants(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::SerialNumber => &[
                "serial_number",
                "serial number",
                "serial no",
                "serial no.",
                "serial#",
                "sn",
                "s/n",
                "serial",
            ],
            CanonicalField::TagId => &[
                "tag_id",
                "tag id",
                "tag",
                "tag number",
                "asset tag",
                "asset tag id",
                "asset id",
            ],
            CanonicalField::ProjectReferenceNum => &[
                "project_reference_num",
                "project_ref_num",
                "project reference number",
                "project reference no",
                "project reference",
                "project ref",
                "project ref no",
                "project number",
                "proj ref",
            ],
            CanonicalField::Category => &["category", "asset category", "type", "asset type"],
            CanonicalField::Model => &["model", "model name", "model number", "asset model"],
            CanonicalField::Status => &["status", "asset status", "state", "condition"],
            CanonicalField::RecipientName => &[
                "recipient_name",
                "recipient",
                "assigned to",
                "assignee",
                "issued to",
                "user",
                "user name",
            ],
            CanonicalField::DepartmentName => {
                &["department_name", "department", "dept", "division"]
            }
            CanonicalField::CustomerName => {
                &["customer_name", "customer name", "customer", "client", "client name"]
            }
            CanonicalField::CustomerReferenceNumber => &[
                "customer_reference_number",
                "customer reference number",
                "customer reference",
                "customer reference no",
                "customer ref",
                "customer ref no",
                "client ref",
            ],
            CanonicalField::Branch => &["branch", "branch name", "location", "site", "office"],
            CanonicalField::ItemName => &[
                "item_name",
                "item name",
                "item",
                "item description",
                "asset name",
                "product",
                "product name",
                "description",
                "name",
            ],
            CanonicalField::Remarks => &["remarks", "remark", "notes", "note", "comment", "comments"],
            CanonicalField::PeripheralName => &[
                "peripheral_name",
                "peripheral name",
                "peripheral",
                "peripherals",
                "peripheral names",
                "accessory",
                "accessories",
            ],
            CanonicalField::SerialCode => &[
                "serial_code",
                "serial code",
                "serial codes",
                "peripheral serial",
                "peripheral serial number",
                "accessory serial",
            ],
        }
    }

    /// Substring keywords for the fallback match, checked in field
    /// declaration order. Keep these normalized (lowercase alphanumeric).
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::SerialNumber => &["serialnumber", "serialno", "serial"],
            CanonicalField::TagId => &["tagid", "assettag", "tag"],
            CanonicalField::ProjectReferenceNum => &["projectref", "projref", "reference"],
            CanonicalField::Category => &["category"],
            CanonicalField::Model => &["model"],
            CanonicalField::Status => &["status"],
            CanonicalField::RecipientName => &["recipient", "assignedto", "assignee", "issuedto"],
            CanonicalField::DepartmentName => &["department", "dept"],
            CanonicalField::CustomerName => &["customer", "client"],
            CanonicalField::CustomerReferenceNumber => &["customerref", "clientref"],
            CanonicalField::Branch => &["branch", "location", "site"],
            CanonicalField::ItemName => &["itemname", "item", "description", "product"],
            CanonicalField::Remarks => &["remark", "note", "comment"],
            CanonicalField::PeripheralName => &["peripheral", "accessor"],
            CanonicalField::SerialCode => &["serialcode", "code"],
        }
    }

    pub fn is_peripheral(&self) -> bool {
        PERIPHERAL_FIELDS.contains(self)
    }

    pub fn is_required(&self) -> bool {
        REQUIRED_FIELDS.contains(self)
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields that must be present in a header mapping for an import to proceed.
pub const REQUIRED_FIELDS: [CanonicalField; 4] = [
    CanonicalField::ProjectReferenceNum,
    CanonicalField::SerialNumber,
    CanonicalField::TagId,
    CanonicalField::ItemName,
];

/// Fields that make up an asset's identity and core data. Peripheral
/// sub-fields are excluded and consolidated separately during grouping.
pub const CORE_ASSET_FIELDS: [CanonicalField; 13] = [
    CanonicalField::SerialNumber,
    CanonicalField::TagId,
    CanonicalField::ProjectReferenceNum,
    CanonicalField::Category,
    CanonicalField::Model,
    CanonicalField::Status,
    CanonicalField::RecipientName,
    CanonicalField::DepartmentName,
    CanonicalField::CustomerName,
    CanonicalField::CustomerReferenceNumber,
    CanonicalField::Branch,
    CanonicalField::ItemName,
    CanonicalField::Remarks,
];

/// Per-peripheral sub-fields carried on spreadsheet rows.
pub const PERIPHERAL_FIELDS: [CanonicalField; 2] =
    [CanonicalField::PeripheralName, CanonicalField::SerialCode];

/// Asset status values accepted by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetStatus {
    Active,
    Inactive,
    Maintenance,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 3] =
        [AssetStatus::Active, AssetStatus::Inactive, AssetStatus::Maintenance];

    /// Canonical spelling used in backend payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Active => "Active",
            AssetStatus::Inactive => "Inactive",
            AssetStatus::Maintenance => "Maintenance",
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(AssetStatus::Active),
            "inactive" => Ok(AssetStatus::Inactive),
            "maintenance" => Ok(AssetStatus::Maintenance),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}
