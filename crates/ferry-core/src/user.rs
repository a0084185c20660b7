//! The canonical user record.

use serde::{Deserialize, Serialize};

/// Connection label used when a record carries no identity pairs
/// (export-file users).
pub const IMPORTED_CONNECTION: &str = "imported-from-json";

/// One `(connection, external id)` pair from the source identity list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPair {
    /// Source connection label (e.g. `Username-Password-Authentication`, `google-oauth2`).
    pub connection: String,
    /// Subject id inside that connection.
    pub external_id: String,
    /// Provider name as reported by the source (`auth0`, `sms`, `google-oauth2`).
    #[serde(default)]
    pub provider: String,
}

impl IdentityPair {
    #[must_use]
    pub fn new(connection: impl Into<String>, external_id: impl Into<String>) -> Self {
        let connection = connection.into();
        Self {
            provider: connection.clone(),
            connection,
            external_id: external_id.into(),
        }
    }
}

/// A source user normalized into one shape-independent value.
///
/// Built once by [`crate::normalize::normalize_user`] and never mutated
/// afterwards; merge results are derived into new values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalUser {
    pub email: String,
    pub source_id: String,
    pub name: String,
    pub given_name: String,
    pub family_name: String,
    pub nickname: String,
    pub picture: String,
    pub phone_number: String,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub blocked: bool,
    pub identities: Vec<IdentityPair>,
    pub created_at: String,
    pub updated_at: String,
}

impl CanonicalUser {
    /// Identifier used in logs and failure lists: email, then source id.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.email.is_empty() {
            &self.source_id
        } else {
            &self.email
        }
    }

    /// Name shown in dry-run listings: display name, then email.
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.name.is_empty() {
            self.label()
        } else {
            &self.name
        }
    }

    /// Connection labels this record contributes, in identity order.
    ///
    /// Records without identity pairs contribute [`IMPORTED_CONNECTION`].
    #[must_use]
    pub fn connections(&self) -> Vec<String> {
        if self.identities.is_empty() {
            return vec![IMPORTED_CONNECTION.to_string()];
        }
        let mut labels: Vec<String> = Vec::with_capacity(self.identities.len());
        for identity in &self.identities {
            if !labels.contains(&identity.connection) {
                labels.push(identity.connection.clone());
            }
        }
        labels
    }
}
