use serde::{Deserialize, Serialize};

use super::error::{AppError, Result};
use super::normalize::normalize;

/// The three loosely-correlated identity fields a client may supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityField {
    Email,
    Phone,
    Username,
}

impl IdentityField {
    pub const ALL: [IdentityField; 3] =
        [IdentityField::Email, IdentityField::Phone, IdentityField::Username];

    /// Canonical record field name this identity field compares against.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            IdentityField::Email => "email",
            IdentityField::Phone => "phone",
            IdentityField::Username => "username",
        }
    }
}

/// An identity query, normalized at construction.
///
/// At least one field is populated; the all-empty query is rejected before
/// matching is ever attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityQuery {
    email: Option<String>,
    phone: Option<String>,
    username: Option<String>,
}

impl IdentityQuery {
    /// Build a query from raw caller input. Each field is normalized; fields
    /// that normalize to empty are treated as absent.
    pub fn new(
        email: Option<&str>,
        phone: Option<&str>,
        username: Option<&str>,
    ) -> Result<Self> {
        let query = Self {
            email: email.and_then(|v| normalize(IdentityField::Email, v)),
            phone: phone.and_then(|v| normalize(IdentityField::Phone, v)),
            username: username.and_then(|v| normalize(IdentityField::Username, v)),
        };

        if query.populated_count() == 0 {
            return Err(AppError::AmbiguousQuery(
                "at least one of email, phone, username is required".to_string(),
            ));
        }

        Ok(query)
    }

    /// Normalized value for one identity field, if populated.
    pub fn field(&self, field: IdentityField) -> Option<&str> {
        match field {
            IdentityField::Email => self.email.as_deref(),
            IdentityField::Phone => self.phone.as_deref(),
            IdentityField::Username => self.username.as_deref(),
        }
    }

    pub fn populated_count(&self) -> usize {
        IdentityField::ALL
            .iter()
            .filter(|f| self.field(**f).is_some())
            .count()
    }

    /// Single-field lookup mode: equality on the sole populated field is
    /// enough to accept a record.
    pub fn is_single_field(&self) -> bool {
        self.populated_count() == 1
    }
}
