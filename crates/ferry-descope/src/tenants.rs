//! Tenant payloads and the tenant existence check.

use ferry_core::{DestinationError, Existence, Organization};
use serde::Serialize;

pub const TENANT_CREATE_PATH: &str = "/v1/mgmt/tenant/create";
pub const TENANT_LOAD_PATH: &str = "/v1/mgmt/tenant";
pub const ADD_TENANT_PATH: &str = "/v1/mgmt/user/update/tenant/add";

/// Tenant create. The organization id is reused verbatim as the tenant id.
#[derive(Debug, Serialize)]
pub struct TenantRequest<'a> {
    name: &'a str,
    id: &'a str,
}

impl<'a> From<&'a Organization> for TenantRequest<'a> {
    fn from(organization: &'a Organization) -> Self {
        Self {
            name: organization.label(),
            id: &organization.id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTenantRequest<'a> {
    pub login_id: &'a str,
    pub tenant_id: &'a str,
}

/// Load URL for one tenant.
#[must_use]
pub fn load_url(base_url: &str, tenant_id: &str) -> String {
    format!("{base_url}{TENANT_LOAD_PATH}?id={}", urlencoding::encode(tenant_id))
}

/// Classify the outcome of a tenant load.
///
/// Only a "not found" answer means absent; any other failure is reported as a
/// failed check so callers can tell the two apart.
#[must_use]
pub fn classify_load(result: Result<(), DestinationError>) -> Existence {
    match result {
        Ok(()) => Existence::Exists(()),
        Err(error) if error.status == Some(404) || error.message.to_lowercase().contains("not found") => {
            Existence::Absent
        }
        Err(error) => Existence::CheckFailed(error.to_string()),
    }
}
