//! # ferry-auth0
//!
//! Source side of a migration: the Auth0 Management API v2 and Auth0 export
//! files.
//!
//! - [`http`]: retrying transport (429 / timeout backoff).
//! - [`pager`]: page-index listing until an empty page.
//! - [`export`]: NDJSON export reader.
//! - [`Auth0Client`]: the [`SourceDirectory`] implementation over the live API.

pub mod export;
pub mod http;
pub mod pager;

mod error;

pub use error::SourceError;
pub use export::{ExportFile, read_export};
pub use http::{RetryPolicy, RetryingTransport};

use async_trait::async_trait;
use ferry_config::{Auth0Config, RetryConfig};
use ferry_core::normalize::{normalize_member, normalize_organization, normalize_permission, normalize_role};
use ferry_core::ports::SourceDirectory;
use ferry_core::{CoreError, Member, Organization, Permission, RawRecord, Role};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::pager::PagedFetcher;

/// Paginated read access to one Auth0 tenant.
pub struct Auth0Client {
    transport: RetryingTransport,
    headers: HeaderMap,
    api_base: String,
    page_size: u32,
}

impl Auth0Client {
    /// Build a client for the configured tenant.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the token is not a valid header value or
    /// the HTTP client cannot be built.
    pub fn new(config: &Auth0Config, retry: &RetryConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| SourceError::InvalidHeader(e.to_string()))?;
        headers.insert(AUTHORIZATION, bearer);

        Ok(Self {
            transport: RetryingTransport::new(RetryPolicy::from_config(retry))?,
            headers,
            api_base: config.api_base(),
            page_size: config.page_size,
        })
    }

    fn fetcher(&self) -> PagedFetcher<'_> {
        PagedFetcher::new(&self.transport, &self.headers, self.page_size)
    }

    async fn list(&self, path: &str) -> Vec<RawRecord> {
        let url = format!("{}/{path}", self.api_base);
        self.fetcher().fetch_all(&url).await
    }
}

/// Keep records that normalize, logging the rest.
fn keep_valid<T>(
    records: Vec<RawRecord>,
    listing: &str,
    normalize: impl Fn(&RawRecord) -> Result<T, CoreError>,
) -> Vec<T> {
    records
        .iter()
        .filter_map(|record| match normalize(record) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(listing, %error, "skipping source record");
                None
            }
        })
        .collect()
}

#[async_trait]
impl SourceDirectory for Auth0Client {
    async fn users(&self) -> Vec<RawRecord> {
        let users = self.list("users").await;
        tracing::info!(count = users.len(), "fetched users from Auth0");
        users
    }

    async fn roles(&self) -> Vec<Role> {
        keep_valid(self.list("roles").await, "roles", normalize_role)
    }

    async fn role_permissions(&self, role_id: &str) -> Vec<Permission> {
        let path = format!("roles/{}/permissions", urlencoding::encode(role_id));
        keep_valid(self.list(&path).await, "role permissions", normalize_permission)
    }

    async fn role_members(&self, role_id: &str) -> Vec<Member> {
        let path = format!("roles/{}/users", urlencoding::encode(role_id));
        keep_valid(self.list(&path).await, "role members", normalize_member)
    }

    async fn organizations(&self) -> Vec<Organization> {
        keep_valid(self.list("organizations").await, "organizations", normalize_organization)
    }

    async fn organization_members(&self, organization_id: &str) -> Vec<Member> {
        let path = format!("organizations/{}/members", urlencoding::encode(organization_id));
        keep_valid(self.list(&path).await, "organization members", normalize_member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_builds_from_config() {
        let config = Auth0Config {
            token: "tok".into(),
            tenant_id: "acme".into(),
            ..Default::default()
        };
        let client = Auth0Client::new(&config, &RetryConfig::default()).unwrap();
        assert_eq!(client.api_base, "https://acme.au.auth0.com/api/v2");
        assert_eq!(client.page_size, 20);
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let config = Auth0Config {
            token: "bad\ntoken".into(),
            tenant_id: "acme".into(),
            ..Default::default()
        };
        let result = Auth0Client::new(&config, &RetryConfig::default());
        assert!(matches!(result, Err(SourceError::InvalidHeader(_))));
    }

    #[test]
    fn keep_valid_drops_invalid_records() {
        let records = vec![
            json!({"id": "rol_1", "name": "admin"}).as_object().cloned().unwrap(),
            json!({"id": "rol_2"}).as_object().cloned().unwrap(),
        ];
        let roles = keep_valid(records, "roles", normalize_role);
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "admin");
    }

    #[tokio::test]
    #[ignore] // requires network
    async fn live_list_roles() {
        let config = Auth0Config {
            token: std::env::var("AUTH0_TOKEN").unwrap_or_default(),
            tenant_id: std::env::var("AUTH0_TENANT_ID").unwrap_or_default(),
            ..Default::default()
        };
        let client = Auth0Client::new(&config, &RetryConfig::default()).unwrap();
        let roles = client.roles().await;
        println!("── roles ── {} results", roles.len());
    }
}
