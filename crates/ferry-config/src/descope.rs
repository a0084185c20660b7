//! Descope (destination) configuration.

use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    "https://api.descope.com".to_string()
}

fn default_invite_url() -> String {
    "https://localhost".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DescopeConfig {
    #[serde(default)]
    pub project_id: String,

    /// Management key used with the project id as bearer credentials.
    #[serde(default)]
    pub management_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Invite URL sent with bulk creates; mail and SMS delivery stay off.
    #[serde(default = "default_invite_url")]
    pub invite_url: String,
}

impl Default for DescopeConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            management_key: String::new(),
            base_url: default_base_url(),
            invite_url: default_invite_url(),
        }
    }
}

impl DescopeConfig {
    pub fn is_configured(&self) -> bool {
        !self.project_id.is_empty() && !self.management_key.is_empty()
    }
}
