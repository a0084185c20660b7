//! # ferry-descope
//!
//! Descope management API client: the destination side of a migration.
//!
//! The client is constructed once from validated credentials and handed to
//! the engine as a [`Destination`]. Every call is made once; retrying
//! rate-limited batches is the engine's job.

pub mod authz;
pub mod tenants;
pub mod users;

mod error;
mod http;

pub use error::DescopeError;

use std::time::Duration;

use async_trait::async_trait;
use ferry_config::DescopeConfig;
use ferry_core::ports::Destination;
use ferry_core::{
    AccountDraft, AccountStatus, DestinationAccount, DestinationError, Existence, Organization, Permission, Role,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;

use crate::http::{check_response, transport_error};

/// Network timeout for one management call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated management client for one Descope project.
pub struct DescopeClient {
    http: reqwest::Client,
    base_url: String,
    invite_url: String,
}

impl DescopeClient {
    /// Build a client from the Descope config section.
    ///
    /// # Errors
    ///
    /// Returns [`DescopeError::NotConfigured`] if the project id or management
    /// key is missing, or another [`DescopeError`] if the HTTP client cannot
    /// be built.
    pub fn new(config: &DescopeConfig) -> Result<Self, DescopeError> {
        if !config.is_configured() {
            return Err(DescopeError::NotConfigured);
        }

        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!(
            "Bearer {}:{}",
            config.project_id, config.management_key
        ))
        .map_err(|e| DescopeError::InvalidHeader(e.to_string()))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .user_agent(concat!("ferry/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            invite_url: config.invite_url.clone(),
        })
    }

    async fn post<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, DestinationError> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        check_response(resp).await
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, DestinationError> {
        let resp = self.http.get(url).send().await.map_err(|e| transport_error(&e))?;
        check_response(resp).await
    }

    async fn search_user(&self, email: &str) -> Result<Option<DestinationAccount>, DestinationError> {
        let resp = self
            .post(users::SEARCH_PATH, &users::SearchRequest { emails: [email] })
            .await?;
        let response: users::SearchResponse = resp
            .json()
            .await
            .map_err(|e| DestinationError::new(format!("undecodable search response: {e}")))?;
        Ok(users::exact_match(response, email))
    }

    async fn search_role(&self, name: &str) -> Result<bool, DestinationError> {
        let resp = self
            .post(authz::ROLE_SEARCH_PATH, &authz::RoleSearchRequest { role_names: [name] })
            .await?;
        let response: authz::RoleSearchResponse = resp
            .json()
            .await
            .map_err(|e| DestinationError::new(format!("undecodable role search response: {e}")))?;
        Ok(response.contains(name))
    }
}

#[async_trait]
impl Destination for DescopeClient {
    async fn find_user_by_email(&self, email: &str) -> Existence<DestinationAccount> {
        match self.search_user(email).await {
            Ok(Some(account)) => Existence::Exists(account),
            Ok(None) => Existence::Absent,
            Err(error) => {
                tracing::warn!(email, %error, "user search failed");
                Existence::CheckFailed(error.to_string())
            }
        }
    }

    async fn update_user(&self, draft: &AccountDraft) -> Result<(), DestinationError> {
        self.post(users::UPDATE_PATH, &users::UserRequest::from(draft))
            .await
            .map(drop)
    }

    async fn set_status(&self, login_id: &str, status: AccountStatus) -> Result<(), DestinationError> {
        let body = users::StatusRequest {
            login_id,
            status: status.as_str(),
        };
        self.post(users::STATUS_PATH, &body).await.map(drop)
    }

    async fn invite_batch(&self, drafts: &[AccountDraft]) -> Result<(), DestinationError> {
        let body = users::BatchRequest::new(drafts, &self.invite_url);
        self.post(users::BATCH_CREATE_PATH, &body).await.map(drop)
    }

    async fn create_permission(&self, permission: &Permission) -> Result<(), DestinationError> {
        self.post(authz::PERMISSION_CREATE_PATH, &authz::PermissionRequest::from(permission))
            .await
            .map(drop)
    }

    async fn role_exists(&self, name: &str) -> Existence {
        match self.search_role(name).await {
            Ok(true) => Existence::Exists(()),
            Ok(false) => Existence::Absent,
            Err(error) => Existence::CheckFailed(error.to_string()),
        }
    }

    async fn create_role(&self, role: &Role) -> Result<(), DestinationError> {
        self.post(authz::ROLE_CREATE_PATH, &authz::RoleRequest::from(role))
            .await
            .map(drop)
    }

    async fn add_roles(&self, login_id: &str, role_names: &[String]) -> Result<(), DestinationError> {
        let body = authz::AddRolesRequest { login_id, role_names };
        self.post(authz::ADD_ROLES_PATH, &body).await.map(drop)
    }

    async fn tenant_exists(&self, tenant_id: &str) -> Existence {
        let url = tenants::load_url(&self.base_url, tenant_id);
        tenants::classify_load(self.get(&url).await.map(drop))
    }

    async fn create_tenant(&self, organization: &Organization) -> Result<(), DestinationError> {
        self.post(tenants::TENANT_CREATE_PATH, &tenants::TenantRequest::from(organization))
            .await
            .map(drop)
    }

    async fn add_tenant(&self, login_id: &str, tenant_id: &str) -> Result<(), DestinationError> {
        let body = tenants::AddTenantRequest { login_id, tenant_id };
        self.post(tenants::ADD_TENANT_PATH, &body).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> DescopeConfig {
        DescopeConfig {
            project_id: "P2abc".into(),
            management_key: "K2xyz".into(),
            base_url: "https://api.descope.example/".into(),
            ..Default::default()
        }
    }

    #[test]
    fn unconfigured_client_is_rejected() {
        let result = DescopeClient::new(&DescopeConfig::default());
        assert!(matches!(result, Err(DescopeError::NotConfigured)));
    }

    #[test]
    fn base_url_is_trimmed() {
        let client = DescopeClient::new(&configured()).unwrap();
        assert_eq!(client.base_url, "https://api.descope.example");
        assert_eq!(client.invite_url, "https://localhost");
    }

    #[test]
    fn credentials_with_control_characters_are_rejected() {
        let config = DescopeConfig {
            management_key: "K2\nxyz".into(),
            ..configured()
        };
        assert!(matches!(
            DescopeClient::new(&config),
            Err(DescopeError::InvalidHeader(_))
        ));
    }

    #[tokio::test]
    #[ignore] // requires network
    async fn live_role_lookup() {
        let config = DescopeConfig {
            project_id: std::env::var("DESCOPE_PROJECT_ID").unwrap_or_default(),
            management_key: std::env::var("DESCOPE_MANAGEMENT_KEY").unwrap_or_default(),
            ..Default::default()
        };
        let client = DescopeClient::new(&config).unwrap();
        let existence = client.role_exists("Tenant Admin").await;
        println!("── role lookup ── {existence:?}");
    }
}
