// ============================================================
// SUBSCRIBER RECORD TYPES
// ============================================================
// One decoded row of the store snapshot, keyed by canonical field names.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical field names the matcher and reconciler care about. Any other
/// header survives as its lower-cased form.
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_USERNAME: &str = "username";
pub const FIELD_EXPIRY: &str = "expiry";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_REGISTRATION_STATUS: &str = "registration status";
pub const FIELD_UPDATED_AT: &str = "updated at";

/// Fold a raw header cell to its canonical field name. The cell is expected
/// to be trimmed and quote-stripped already.
pub fn canonical_field_name(header: &str) -> String {
    let lowered = header.to_lowercase();
    match lowered.as_str() {
        "expire date" | "expiredate" | "expire_date" => FIELD_EXPIRY.to_string(),
        _ => lowered,
    }
}

/// A single named cell of a subscriber record, in source column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordField {
    /// Canonical field name (lower-cased, alias-folded header).
    pub name: String,
    /// Raw cell value, trimmed and quote-stripped but otherwise untouched.
    pub value: String,
}

/// One row of the snapshot.
///
/// `row_index` is the 1-based position among data rows in source order. It
/// is an update target only and carries no identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberRecord {
    pub row_index: usize,
    pub fields: Vec<RecordField>,
    field_map: HashMap<String, String>,
}

impl SubscriberRecord {
    pub fn new(row_index: usize, fields: Vec<RecordField>) -> Self {
        let field_map = fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect();

        Self { row_index, fields, field_map }
    }

    /// Raw value for a canonical field name, if the column exists.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.field_map.get(name).map(String::as_str)
    }

    /// Raw value, treating a missing column and an empty cell the same.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    pub fn username(&self) -> Option<&str> {
        self.get_non_empty(FIELD_USERNAME)
    }

    pub fn expiry(&self) -> Option<&str> {
        self.get_non_empty(FIELD_EXPIRY)
    }

    /// Presence flag only. The password value itself never leaves the core.
    pub fn has_password(&self) -> bool {
        self.get_non_empty(FIELD_PASSWORD).is_some()
    }
}
