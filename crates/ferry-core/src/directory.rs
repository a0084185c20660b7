//! Roles, permissions and organizations.

use serde::{Deserialize, Serialize};

/// A permission, unique by name across the destination project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub name: String,
    pub description: String,
}

/// A source role. `source_id` addresses its members and permissions upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub source_id: String,
    pub name: String,
    pub description: String,
    pub permission_names: Vec<String>,
}

/// A source organization; its id is reused verbatim as the tenant id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub display_name: String,
}

impl Organization {
    /// Display name, falling back to the id when the source left it blank.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.id
        } else {
            &self.display_name
        }
    }
}

/// A member of a role or organization, addressed at the destination by email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub email: String,
}
