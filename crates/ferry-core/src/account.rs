//! Destination-side account shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Custom attribute holding the comma-joined list of merged source connections.
pub const CONNECTION_ATTRIBUTE: &str = "connection";

/// Custom attribute marking accounts created by a migration run.
pub const FRESHLY_MIGRATED_ATTRIBUTE: &str = "freshlyMigrated";

/// Custom attribute carrying the source nickname (the destination has no field for it).
pub const NICKNAME_ATTRIBUTE: &str = "nickname";

/// Enabled/disabled status of a destination account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Enabled,
    Disabled,
    /// Invited but not yet signed in; treated as enabled for reconciliation.
    Invited,
}

impl AccountStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Invited => "invited",
        }
    }

    #[must_use]
    pub const fn is_disabled(self) -> bool {
        matches!(self, Self::Disabled)
    }

    /// Parse the provider's status string; unknown values count as enabled.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "disabled" => Self::Disabled,
            "invited" => Self::Invited,
            _ => Self::Enabled,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pre-hashed credential carried into the destination create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordHash {
    Bcrypt(String),
}

/// An account as loaded from the destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationAccount {
    /// Login identifiers; the first is the primary one.
    pub login_ids: Vec<String>,
    pub email: String,
    pub verified_email: bool,
    pub verified_phone: bool,
    pub name: String,
    pub given_name: String,
    pub family_name: String,
    pub picture: String,
    pub phone: String,
    pub custom_attributes: Map<String, Value>,
    pub status: AccountStatus,
}

impl DestinationAccount {
    #[must_use]
    pub fn primary_login_id(&self) -> Option<&str> {
        self.login_ids.first().map(String::as_str)
    }

    /// Connection labels recorded in the connection attribute, in stored order.
    #[must_use]
    pub fn recorded_connections(&self) -> Vec<String> {
        self.custom_attributes
            .get(CONNECTION_ATTRIBUTE)
            .and_then(Value::as_str)
            .map(split_connections)
            .unwrap_or_default()
    }
}

/// Split a comma-joined connection list, dropping blanks and repeats.
///
/// Labels keep the order of their first appearance.
#[must_use]
pub fn split_connections(joined: &str) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for label in joined.split(',').map(str::trim) {
        if !label.is_empty() && !labels.iter().any(|seen| seen == label) {
            labels.push(label.to_string());
        }
    }
    labels
}

/// The full field set sent on account create, bulk invite, or update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountDraft {
    pub login_id: String,
    pub additional_login_ids: Vec<String>,
    pub email: String,
    pub display_name: String,
    pub given_name: String,
    pub family_name: String,
    pub phone: String,
    pub picture: String,
    pub custom_attributes: Map<String, Value>,
    pub verified_email: bool,
    pub verified_phone: bool,
    pub password: Option<PasswordHash>,
    /// Status to enforce once the account exists. Not part of the create payload.
    #[serde(skip)]
    pub status: AccountStatus,
}

impl AccountDraft {
    /// Identifier used in failure lists: email, then login id.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.email.is_empty() {
            &self.login_id
        } else {
            &self.email
        }
    }
}
