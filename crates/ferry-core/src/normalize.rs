//! Raw source JSON → canonical records.
//!
//! Two user shapes are accepted:
//!
//! - [`SourceShape::Api`]: live Management API records (`snake_case` keys,
//!   nested `identities` list).
//! - [`SourceShape::File`]: flat export-file records (`Capitalized Keys`, no
//!   identities).
//!
//! Every user attribute is resolved through one ordered rule in
//! [`USER_FIELD_RULES`]: the export-file key is tried first, then the API key,
//! then a type-appropriate empty default. A key only wins when its value is
//! non-empty (a blank string or `false` falls through to the next key), so both
//! shapes land on the same canonical fields.

use serde_json::{Map, Value};

use crate::directory::{Member, Organization, Permission, Role};
use crate::errors::CoreError;
use crate::user::{CanonicalUser, IdentityPair};

/// One undecoded source record.
pub type RawRecord = Map<String, Value>;

/// Which input convention a raw user record follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceShape {
    Api,
    File,
}

/// Canonical attribute a [`FieldRule`] resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    SourceId,
    Email,
    EmailVerified,
    Name,
    GivenName,
    FamilyName,
    Nickname,
    Picture,
    PhoneNumber,
    PhoneVerified,
    Blocked,
    CreatedAt,
    UpdatedAt,
}

/// Candidate keys for one canonical attribute, in priority order.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: UserField,
    pub keys: &'static [&'static str],
}

pub const USER_FIELD_RULES: &[FieldRule] = &[
    FieldRule { field: UserField::SourceId, keys: &["Id", "user_id"] },
    FieldRule { field: UserField::Email, keys: &["Email", "email"] },
    FieldRule { field: UserField::EmailVerified, keys: &["Email Verified", "email_verified"] },
    FieldRule { field: UserField::Name, keys: &["Name", "name"] },
    FieldRule { field: UserField::GivenName, keys: &["Given Name", "given_name"] },
    FieldRule { field: UserField::FamilyName, keys: &["Family Name", "family_name"] },
    FieldRule { field: UserField::Nickname, keys: &["Nickname", "nickname"] },
    FieldRule { field: UserField::Picture, keys: &["Picture", "picture"] },
    FieldRule { field: UserField::PhoneNumber, keys: &["Phone Number", "phone_number"] },
    FieldRule { field: UserField::PhoneVerified, keys: &["Phone Verified", "phone_verified"] },
    FieldRule { field: UserField::Blocked, keys: &["Blocked", "blocked"] },
    FieldRule { field: UserField::CreatedAt, keys: &["Created At", "created_at"] },
    FieldRule { field: UserField::UpdatedAt, keys: &["Updated At", "updated_at"] },
];

/// Normalize a raw user.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] when neither an email nor a user id is present.
pub fn normalize_user(record: &RawRecord, shape: SourceShape) -> Result<CanonicalUser, CoreError> {
    let mut user = CanonicalUser::default();
    for rule in USER_FIELD_RULES {
        let value = first_present(record, rule.keys);
        match rule.field {
            UserField::SourceId => user.source_id = text(value),
            UserField::Email => user.email = text(value),
            UserField::EmailVerified => user.email_verified = flag(value),
            UserField::Name => user.name = text(value),
            UserField::GivenName => user.given_name = text(value),
            UserField::FamilyName => user.family_name = text(value),
            UserField::Nickname => user.nickname = text(value),
            UserField::Picture => user.picture = text(value),
            UserField::PhoneNumber => user.phone_number = text(value),
            UserField::PhoneVerified => user.phone_verified = flag(value),
            UserField::Blocked => user.blocked = flag(value),
            UserField::CreatedAt => user.created_at = text(value),
            UserField::UpdatedAt => user.updated_at = text(value),
        }
    }

    if shape == SourceShape::Api {
        user.identities = identities(record);
    }

    if user.email.is_empty() && user.source_id.is_empty() {
        return Err(CoreError::Validation(
            "user record has neither an email nor a user id".to_string(),
        ));
    }
    Ok(user)
}

/// Normalize a raw role (`id`, `name`, `description`).
///
/// # Errors
///
/// Returns [`CoreError::Validation`] when the role has no name.
pub fn normalize_role(record: &RawRecord) -> Result<Role, CoreError> {
    let name = first_text(record, &["Name", "name"]);
    if name.is_empty() {
        return Err(CoreError::Validation("role record has no name".to_string()));
    }
    Ok(Role {
        source_id: first_text(record, &["Id", "id"]),
        name,
        description: first_text(record, &["Description", "description"]),
        permission_names: Vec::new(),
    })
}

/// Normalize a raw permission (`permission_name`, `description`).
///
/// # Errors
///
/// Returns [`CoreError::Validation`] when the permission has no name.
pub fn normalize_permission(record: &RawRecord) -> Result<Permission, CoreError> {
    let name = first_text(record, &["permission_name", "name"]);
    if name.is_empty() {
        return Err(CoreError::Validation("permission record has no name".to_string()));
    }
    Ok(Permission {
        name,
        description: first_text(record, &["description"]),
    })
}

/// Normalize a raw organization (`id`, `display_name`).
///
/// # Errors
///
/// Returns [`CoreError::Validation`] when the organization has no id.
pub fn normalize_organization(record: &RawRecord) -> Result<Organization, CoreError> {
    let id = first_text(record, &["id"]);
    if id.is_empty() {
        return Err(CoreError::Validation("organization record has no id".to_string()));
    }
    Ok(Organization {
        id,
        display_name: first_text(record, &["display_name", "name"]),
    })
}

/// Normalize a role or organization member.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] when the member has neither email nor user id.
pub fn normalize_member(record: &RawRecord) -> Result<Member, CoreError> {
    let member = Member {
        user_id: first_text(record, &["user_id"]),
        email: first_text(record, &["email"]),
    };
    if member.user_id.is_empty() && member.email.is_empty() {
        return Err(CoreError::Validation("member record has neither email nor user id".to_string()));
    }
    Ok(member)
}

/// Text of the first non-empty key, or `""`.
#[must_use]
pub fn first_text(record: &RawRecord, keys: &[&str]) -> String {
    text(first_present(record, keys))
}

fn first_present<'a>(record: &'a RawRecord, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| is_present(value))
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn identities(record: &RawRecord) -> Vec<IdentityPair> {
    let Some(Value::Array(items)) = record.get("identities") else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|identity| {
            let connection = first_text(identity, &["connection"]);
            if connection.is_empty() {
                tracing::debug!("skipping identity without a connection label");
                return None;
            }
            Some(IdentityPair {
                external_id: first_text(identity, &["user_id"]),
                provider: first_text(identity, &["provider"]),
                connection,
            })
        })
        .collect()
}
