//! User management payloads: update, status, bulk invite and search.

use ferry_core::{AccountDraft, AccountStatus, DestinationAccount, PasswordHash};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const UPDATE_PATH: &str = "/v1/mgmt/user/update";
pub const STATUS_PATH: &str = "/v1/mgmt/user/update/status";
pub const BATCH_CREATE_PATH: &str = "/v1/mgmt/user/create/batch";
pub const SEARCH_PATH: &str = "/v2/mgmt/user/search";

#[derive(Debug, Serialize)]
struct BcryptHash<'a> {
    hash: &'a str,
}

#[derive(Debug, Serialize)]
struct HashedPassword<'a> {
    bcrypt: BcryptHash<'a>,
}

/// Account fields shared by create, update and bulk create.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest<'a> {
    login_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    email: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    phone: &'a str,
    #[serde(rename = "name", skip_serializing_if = "str::is_empty")]
    display_name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    given_name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    family_name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    picture: &'a str,
    #[serde(skip_serializing_if = "Map::is_empty")]
    custom_attributes: &'a Map<String, Value>,
    verified_email: bool,
    verified_phone: bool,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    additional_login_ids: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    hashed_password: Option<HashedPassword<'a>>,
}

impl<'a> From<&'a AccountDraft> for UserRequest<'a> {
    fn from(draft: &'a AccountDraft) -> Self {
        Self {
            login_id: &draft.login_id,
            email: &draft.email,
            phone: &draft.phone,
            display_name: &draft.display_name,
            given_name: &draft.given_name,
            family_name: &draft.family_name,
            picture: &draft.picture,
            custom_attributes: &draft.custom_attributes,
            verified_email: draft.verified_email,
            verified_phone: draft.verified_phone,
            additional_login_ids: &draft.additional_login_ids,
            hashed_password: draft.password.as_ref().map(|password| match password {
                PasswordHash::Bcrypt(hash) => HashedPassword {
                    bcrypt: BcryptHash { hash },
                },
            }),
        }
    }
}

/// Bulk create. Invitations are marked but neither mail nor SMS is sent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest<'a> {
    users: Vec<UserRequest<'a>>,
    invite: bool,
    invite_url: &'a str,
    send_mail: bool,
    #[serde(rename = "sendSMS")]
    send_sms: bool,
}

impl<'a> BatchRequest<'a> {
    pub fn new(drafts: &'a [AccountDraft], invite_url: &'a str) -> Self {
        Self {
            users: drafts.iter().map(UserRequest::from).collect(),
            invite: true,
            invite_url,
            send_mail: false,
            send_sms: false,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest<'a> {
    pub login_id: &'a str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub emails: [&'a str; 1],
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserResponse {
    login_ids: Vec<String>,
    email: String,
    verified_email: bool,
    verified_phone: bool,
    name: String,
    given_name: String,
    family_name: String,
    picture: String,
    phone: String,
    custom_attributes: Map<String, Value>,
    status: String,
}

impl From<UserResponse> for DestinationAccount {
    fn from(user: UserResponse) -> Self {
        Self {
            login_ids: user.login_ids,
            email: user.email,
            verified_email: user.verified_email,
            verified_phone: user.verified_phone,
            name: user.name,
            given_name: user.given_name,
            family_name: user.family_name,
            picture: user.picture,
            phone: user.phone,
            custom_attributes: user.custom_attributes,
            status: AccountStatus::parse(&user.status),
        }
    }
}

/// The first search hit whose email matches exactly (ignoring ASCII case).
///
/// Search may return fuzzy hits; anything else is ignored.
#[must_use]
pub fn exact_match(response: SearchResponse, email: &str) -> Option<DestinationAccount> {
    response
        .users
        .into_iter()
        .find(|user| user.email.eq_ignore_ascii_case(email))
        .map(DestinationAccount::from)
}
