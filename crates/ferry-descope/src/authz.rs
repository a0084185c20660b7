//! Role and permission payloads.

use ferry_core::{Permission, Role};
use serde::{Deserialize, Serialize};

pub const PERMISSION_CREATE_PATH: &str = "/v1/mgmt/permission/create";
pub const ROLE_CREATE_PATH: &str = "/v1/mgmt/role/create";
pub const ROLE_SEARCH_PATH: &str = "/v1/mgmt/role/search";
pub const ADD_ROLES_PATH: &str = "/v1/mgmt/user/update/role/add";

#[derive(Debug, Serialize)]
pub struct PermissionRequest<'a> {
    name: &'a str,
    description: &'a str,
}

impl<'a> From<&'a Permission> for PermissionRequest<'a> {
    fn from(permission: &'a Permission) -> Self {
        Self {
            name: &permission.name,
            description: &permission.description,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest<'a> {
    name: &'a str,
    description: &'a str,
    permission_names: &'a [String],
}

impl<'a> From<&'a Role> for RoleRequest<'a> {
    fn from(role: &'a Role) -> Self {
        Self {
            name: &role.name,
            description: &role.description,
            permission_names: &role.permission_names,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSearchRequest<'a> {
    pub role_names: [&'a str; 1],
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RoleSearchResponse {
    pub roles: Vec<RoleEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RoleEntry {
    pub name: String,
}

impl RoleSearchResponse {
    /// Whether the search returned a role with exactly this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.roles.iter().any(|role| role.name == name)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRolesRequest<'a> {
    pub login_id: &'a str,
    pub role_names: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn role_request_lists_permissions() {
        let role = Role {
            source_id: "rol_1".into(),
            name: "admin".into(),
            description: "Administrators".into(),
            permission_names: vec!["read:users".into(), "write:users".into()],
        };
        let body = serde_json::to_value(RoleRequest::from(&role)).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "admin",
                "description": "Administrators",
                "permissionNames": ["read:users", "write:users"]
            })
        );
    }

    #[test]
    fn role_search_matches_exact_name_only() {
        let response: RoleSearchResponse =
            serde_json::from_str(r#"{"roles": [{"name": "admin-readonly", "description": ""}]}"#).unwrap();
        assert!(!response.contains("admin"));
        assert!(response.contains("admin-readonly"));

        let empty: RoleSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(!empty.contains("admin"));
    }
}
