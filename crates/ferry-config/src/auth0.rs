//! Auth0 (source) configuration.

use serde::{Deserialize, Serialize};

/// Default page size for Management API listings.
const fn default_page_size() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Auth0Config {
    /// Management API bearer token.
    #[serde(default)]
    pub token: String,

    /// Tenant name (the first label of `<tenant>.au.auth0.com`).
    #[serde(default)]
    pub tenant_id: String,

    /// Full tenant domain. Empty means `<tenant_id>.au.auth0.com`.
    #[serde(default)]
    pub domain: String,

    /// Records requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for Auth0Config {
    fn default() -> Self {
        Self {
            token: String::new(),
            tenant_id: String::new(),
            domain: String::new(),
            page_size: default_page_size(),
        }
    }
}

impl Auth0Config {
    /// Check if the config has enough to call the Management API.
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && (!self.tenant_id.is_empty() || !self.domain.is_empty())
    }

    /// Tenant domain, derived from the tenant id when not set explicitly.
    pub fn resolved_domain(&self) -> String {
        if self.domain.is_empty() {
            format!("{}.au.auth0.com", self.tenant_id)
        } else {
            self.domain.trim_end_matches('/').to_string()
        }
    }

    /// Base URL of the Management API v2.
    pub fn api_base(&self) -> String {
        let domain = self.resolved_domain();
        if domain.starts_with("http://") || domain.starts_with("https://") {
            format!("{domain}/api/v2")
        } else {
            format!("https://{domain}/api/v2")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = Auth0Config::default();
        assert!(!config.is_configured());
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn domain_derived_from_tenant() {
        let config = Auth0Config {
            token: "tok".into(),
            tenant_id: "acme-dev".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
        assert_eq!(config.api_base(), "https://acme-dev.au.auth0.com/api/v2");
    }

    #[test]
    fn explicit_domain_wins() {
        let config = Auth0Config {
            tenant_id: "ignored".into(),
            domain: "http://localhost:8080/".into(),
            ..Default::default()
        };
        assert_eq!(config.api_base(), "http://localhost:8080/api/v2");
    }
}
