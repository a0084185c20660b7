//! Identity resolution and merge planning.
//!
//! A canonical user either has no destination account yet (it becomes an
//! [`AccountDraft`] for the bulk invite) or already has one, in which case a
//! [`MergePlan`] describes the minimal calls that fold the new source identity
//! into it:
//!
//! - connections the account has not seen yet are appended to its connection
//!   attribute and their login ids added; no new connections means no update;
//! - non-empty source name, given/family name and picture win over stored
//!   values, everything else keeps the destination's value;
//! - disabling is sticky: an account ends disabled when either side is, and a
//!   merge never re-enables it.

use ferry_core::account::{CONNECTION_ATTRIBUTE, FRESHLY_MIGRATED_ATTRIBUTE, NICKNAME_ATTRIBUTE, split_connections};
use ferry_core::ports::Destination;
use ferry_core::{AccountDraft, AccountStatus, CanonicalUser, CoreError, DestinationAccount, Existence};
use serde_json::{Map, Value};

/// What to do with one canonical user.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// No account exists; create this one.
    New(AccountDraft),
    /// An account with this email already exists.
    Existing(DestinationAccount),
}

/// Calls needed to merge a source user into an existing account.
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    /// Primary login id of the existing account.
    pub login_id: String,
    /// Full update to issue, present only when new connections were found.
    pub update: Option<AccountDraft>,
    /// Status transition to apply after the update.
    pub status_change: Option<AccountStatus>,
    /// Source blocked flag and destination status disagree.
    pub disabled_mismatch: bool,
}

impl MergePlan {
    /// Whether applying the plan issues no calls at all.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.update.is_none() && self.status_change.is_none()
    }
}

/// Look up `user` at the destination and decide between create and merge.
///
/// A failed lookup is treated like a missing account (the create is
/// attempted) and logged.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] when the user is new but no login id can
/// be derived for it.
pub async fn resolve(destination: &dyn Destination, user: &CanonicalUser) -> Result<Resolution, CoreError> {
    if !user.email.is_empty() {
        match destination.find_user_by_email(&user.email).await {
            Existence::Exists(account) => return Ok(Resolution::Existing(account)),
            Existence::Absent => {}
            Existence::CheckFailed(reason) => {
                tracing::warn!(email = %user.email, %reason, "account lookup failed; treating as new");
            }
        }
    }
    create_draft(user).map(Resolution::New)
}

/// Login ids for a source user, primary first, without duplicates.
///
/// Identity pairs map to login ids by connection label: password databases
/// use the email, SMS uses the phone number, and anything else becomes
/// `<label prefix>-<external id>`. Users without identity pairs log in with
/// their email, or their source id when there is no email.
#[must_use]
pub fn derive_login_ids(user: &CanonicalUser) -> Vec<String> {
    let candidates: Vec<String> = if user.identities.is_empty() {
        vec![if user.email.is_empty() {
            user.source_id.clone()
        } else {
            user.email.clone()
        }]
    } else {
        user.identities
            .iter()
            .map(|identity| {
                let label = identity.connection.as_str();
                if label.contains("Username") {
                    user.email.clone()
                } else if label.contains("sms") {
                    user.phone_number.clone()
                } else if let Some((prefix, _)) = label.split_once('-') {
                    format!("{prefix}-{}", identity.external_id)
                } else {
                    format!("{label}-{}", identity.external_id)
                }
            })
            .collect()
    };

    let mut login_ids: Vec<String> = Vec::with_capacity(candidates.len());
    for id in candidates {
        if !id.is_empty() && !login_ids.contains(&id) {
            login_ids.push(id);
        }
    }
    login_ids
}

/// Build the create payload for a user with no destination account.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] when no login id can be derived.
pub fn create_draft(user: &CanonicalUser) -> Result<AccountDraft, CoreError> {
    let mut login_ids = derive_login_ids(user).into_iter();
    let Some(login_id) = login_ids.next() else {
        return Err(CoreError::Validation(format!(
            "no usable login id for {}",
            user.label()
        )));
    };

    let mut attributes = Map::new();
    attributes.insert(
        CONNECTION_ATTRIBUTE.to_string(),
        Value::String(user.connections().join(",")),
    );
    attributes.insert(FRESHLY_MIGRATED_ATTRIBUTE.to_string(), Value::Bool(true));
    if !user.nickname.is_empty() {
        attributes.insert(NICKNAME_ATTRIBUTE.to_string(), Value::String(user.nickname.clone()));
    }

    let phone = if user.identities.is_empty() {
        String::new()
    } else {
        user.phone_number.clone()
    };

    Ok(AccountDraft {
        login_id,
        additional_login_ids: login_ids.collect(),
        email: user.email.clone(),
        display_name: first_non_empty(&[user.name.as_str(), user.nickname.as_str(), user.email.as_str()]).to_string(),
        given_name: user.given_name.clone(),
        family_name: user.family_name.clone(),
        verified_phone: user.phone_verified && !phone.is_empty(),
        phone,
        picture: user.picture.clone(),
        custom_attributes: attributes,
        verified_email: user.email_verified,
        password: None,
        status: if user.blocked {
            AccountStatus::Disabled
        } else {
            AccountStatus::Enabled
        },
    })
}

/// Plan the merge of `user` into the existing `account`.
#[must_use]
pub fn plan_merge(user: &CanonicalUser, account: &DestinationAccount) -> MergePlan {
    let login_id = account
        .primary_login_id()
        .unwrap_or(account.email.as_str())
        .to_string();

    let recorded = account.recorded_connections();
    let fresh: Vec<String> = user
        .connections()
        .into_iter()
        .filter(|label| !recorded.contains(label))
        .collect();

    let update = if fresh.is_empty() {
        None
    } else {
        Some(merged_draft(user, account, &login_id, recorded, fresh))
    };

    let destination_disabled = account.status.is_disabled();
    MergePlan {
        login_id,
        update,
        status_change: (user.blocked && !destination_disabled).then_some(AccountStatus::Disabled),
        disabled_mismatch: user.blocked != destination_disabled,
    }
}

fn merged_draft(
    user: &CanonicalUser,
    account: &DestinationAccount,
    login_id: &str,
    mut connections: Vec<String>,
    fresh: Vec<String>,
) -> AccountDraft {
    connections.extend(fresh);

    let mut attributes = account.custom_attributes.clone();
    attributes.insert(
        CONNECTION_ATTRIBUTE.to_string(),
        Value::String(connections.join(",")),
    );

    let mut additional: Vec<String> = account.login_ids.iter().skip(1).cloned().collect();
    for id in derive_login_ids(user) {
        if id != login_id && !additional.contains(&id) {
            additional.push(id);
        }
    }

    AccountDraft {
        login_id: login_id.to_string(),
        additional_login_ids: additional,
        email: account.email.clone(),
        display_name: first_non_empty(&[user.name.as_str(), account.name.as_str()]).to_string(),
        given_name: first_non_empty(&[user.given_name.as_str(), account.given_name.as_str()]).to_string(),
        family_name: first_non_empty(&[user.family_name.as_str(), account.family_name.as_str()]).to_string(),
        phone: account.phone.clone(),
        picture: first_non_empty(&[user.picture.as_str(), account.picture.as_str()]).to_string(),
        custom_attributes: attributes,
        verified_email: account.verified_email,
        verified_phone: account.verified_phone,
        password: None,
        status: account.status,
    }
}

/// Fold a later source record for the same email into a draft that has not
/// been invited yet.
///
/// Follows the merge rules: connections and login ids are unioned in order,
/// non-empty source names and picture win, and a blocked record disables the
/// draft.
pub fn fold_into_draft(draft: &mut AccountDraft, user: &CanonicalUser) {
    let mut connections = draft
        .custom_attributes
        .get(CONNECTION_ATTRIBUTE)
        .and_then(Value::as_str)
        .map(split_connections)
        .unwrap_or_default();
    for label in user.connections() {
        if !connections.contains(&label) {
            connections.push(label);
        }
    }
    draft.custom_attributes.insert(
        CONNECTION_ATTRIBUTE.to_string(),
        Value::String(connections.join(",")),
    );

    for id in derive_login_ids(user) {
        if id != draft.login_id && !draft.additional_login_ids.contains(&id) {
            draft.additional_login_ids.push(id);
        }
    }

    draft.display_name = first_non_empty(&[user.name.as_str(), draft.display_name.as_str()]).to_string();
    draft.given_name = first_non_empty(&[user.given_name.as_str(), draft.given_name.as_str()]).to_string();
    draft.family_name = first_non_empty(&[user.family_name.as_str(), draft.family_name.as_str()]).to_string();
    draft.picture = first_non_empty(&[user.picture.as_str(), draft.picture.as_str()]).to_string();
    if user.blocked {
        draft.status = AccountStatus::Disabled;
    }
}

fn first_non_empty<'a>(values: &[&'a str]) -> &'a str {
    values.iter().copied().find(|value| !value.is_empty()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_core::IdentityPair;
    use ferry_core::user::IMPORTED_CONNECTION;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn user_with(identities: Vec<IdentityPair>) -> CanonicalUser {
        CanonicalUser {
            email: "ann@example.com".into(),
            source_id: "auth0|ann".into(),
            name: "Ann Example".into(),
            phone_number: "+15550100".into(),
            phone_verified: true,
            identities,
            ..Default::default()
        }
    }

    fn account_with(connections: &str, status: AccountStatus) -> DestinationAccount {
        let mut custom_attributes = Map::new();
        custom_attributes.insert(CONNECTION_ATTRIBUTE.into(), json!(connections));
        custom_attributes.insert(FRESHLY_MIGRATED_ATTRIBUTE.into(), json!(true));
        DestinationAccount {
            login_ids: vec!["ann@example.com".into()],
            email: "ann@example.com".into(),
            verified_email: true,
            name: "Stored Name".into(),
            given_name: "Stored".into(),
            picture: "https://img.example/stored.png".into(),
            custom_attributes,
            status,
            ..Default::default()
        }
    }

    #[test]
    fn login_ids_follow_connection_rules() {
        let user = user_with(vec![
            IdentityPair::new("Username-Password-Authentication", "ann"),
            IdentityPair::new("sms", "+15550100"),
            IdentityPair::new("google-oauth2", "1234"),
            IdentityPair::new("github", "99"),
        ]);
        assert_eq!(
            derive_login_ids(&user),
            vec!["ann@example.com", "+15550100", "google-1234", "github-99"]
        );
    }

    #[test]
    fn login_ids_skip_blank_phone_and_duplicates() {
        let mut user = user_with(vec![
            IdentityPair::new("sms", "x"),
            IdentityPair::new("Username-Password-Authentication", "a"),
            IdentityPair::new("Username-Password-Authentication", "b"),
        ]);
        user.phone_number.clear();
        assert_eq!(derive_login_ids(&user), vec!["ann@example.com"]);
    }

    #[test]
    fn file_users_log_in_with_email_or_source_id() {
        let user = user_with(Vec::new());
        assert_eq!(derive_login_ids(&user), vec!["ann@example.com"]);

        let anonymous = CanonicalUser {
            source_id: "auth0|42".into(),
            ..Default::default()
        };
        assert_eq!(derive_login_ids(&anonymous), vec!["auth0|42"]);
    }

    #[test]
    fn create_draft_for_file_user() {
        let mut user = user_with(Vec::new());
        user.name.clear();
        user.nickname = "annie".into();
        user.blocked = true;

        let draft = create_draft(&user).unwrap();
        assert_eq!(draft.login_id, "ann@example.com");
        assert!(draft.additional_login_ids.is_empty());
        assert_eq!(draft.display_name, "annie");
        assert_eq!(draft.custom_attributes[CONNECTION_ATTRIBUTE], json!(IMPORTED_CONNECTION));
        assert_eq!(draft.custom_attributes[FRESHLY_MIGRATED_ATTRIBUTE], json!(true));
        assert_eq!(draft.custom_attributes[NICKNAME_ATTRIBUTE], json!("annie"));
        assert_eq!(draft.phone, "", "phone is only carried for identity-backed users");
        assert!(!draft.verified_phone);
        assert_eq!(draft.status, AccountStatus::Disabled);
    }

    #[test]
    fn create_draft_for_api_user() {
        let user = user_with(vec![
            IdentityPair::new("Username-Password-Authentication", "ann"),
            IdentityPair::new("google-oauth2", "1234"),
        ]);
        let draft = create_draft(&user).unwrap();
        assert_eq!(draft.login_id, "ann@example.com");
        assert_eq!(draft.additional_login_ids, vec!["google-1234"]);
        assert_eq!(
            draft.custom_attributes[CONNECTION_ATTRIBUTE],
            json!("Username-Password-Authentication,google-oauth2")
        );
        assert_eq!(draft.phone, "+15550100");
        assert!(draft.verified_phone);
        assert!(!draft.custom_attributes.contains_key(NICKNAME_ATTRIBUTE));
    }

    #[test]
    fn create_draft_without_login_id_is_rejected() {
        let user = CanonicalUser {
            source_id: "sms|1".into(),
            identities: vec![IdentityPair::new("sms", "1")],
            ..Default::default()
        };
        assert!(matches!(create_draft(&user), Err(CoreError::Validation(_))));
    }

    #[test]
    fn merge_with_known_connections_is_noop() {
        let user = user_with(vec![IdentityPair::new("A", "1")]);
        let plan = plan_merge(&user, &account_with("A", AccountStatus::Enabled));
        assert!(plan.is_noop());
        assert!(!plan.disabled_mismatch);
    }

    #[test]
    fn merge_appends_new_connections_in_order() {
        let user = user_with(vec![
            IdentityPair::new("A", "1"),
            IdentityPair::new("google-oauth2", "77"),
        ]);
        let mut account = account_with("A", AccountStatus::Enabled);
        account.login_ids.push("A-1".into());

        let plan = plan_merge(&user, &account);
        let update = plan.update.unwrap();
        assert_eq!(update.login_id, "ann@example.com");
        assert_eq!(update.custom_attributes[CONNECTION_ATTRIBUTE], json!("A,google-oauth2"));
        assert_eq!(update.custom_attributes[FRESHLY_MIGRATED_ATTRIBUTE], json!(true));
        assert_eq!(update.additional_login_ids, vec!["A-1", "google-77"]);
    }

    #[test]
    fn merge_prefers_non_empty_source_values() {
        let user = user_with(vec![IdentityPair::new("B", "1")]);
        let update = plan_merge(&user, &account_with("A", AccountStatus::Enabled))
            .update
            .unwrap();
        assert_eq!(update.display_name, "Ann Example");
        assert_eq!(update.given_name, "Stored", "blank source value keeps stored one");
        assert_eq!(update.picture, "https://img.example/stored.png");
        assert!(update.verified_email);
        assert_eq!(update.phone, "", "phone stays the destination's");
    }

    #[test]
    fn disabled_destination_stays_disabled() {
        let user = user_with(vec![IdentityPair::new("A", "1")]);
        let plan = plan_merge(&user, &account_with("A", AccountStatus::Disabled));
        assert_eq!(plan.status_change, None);
        assert!(plan.disabled_mismatch);
    }

    #[test]
    fn blocked_source_disables_enabled_destination() {
        let mut user = user_with(vec![IdentityPair::new("A", "1")]);
        user.blocked = true;
        let plan = plan_merge(&user, &account_with("A", AccountStatus::Enabled));
        assert_eq!(plan.status_change, Some(AccountStatus::Disabled));
        assert!(plan.disabled_mismatch);
        assert!(plan.update.is_none());
    }

    #[test]
    fn blocked_on_both_sides_needs_nothing() {
        let mut user = user_with(vec![IdentityPair::new("A", "1")]);
        user.blocked = true;
        let plan = plan_merge(&user, &account_with("A", AccountStatus::Disabled));
        assert!(plan.is_noop());
        assert!(!plan.disabled_mismatch);
    }

    #[test]
    fn fold_unions_connections_and_login_ids_into_pending_draft() {
        let mut draft = create_draft(&user_with(vec![IdentityPair::new("A", "1")])).unwrap();
        let mut later = user_with(vec![
            IdentityPair::new("google-oauth2", "2"),
            IdentityPair::new("A", "1"),
        ]);
        later.name = String::new();
        later.picture = "https://img.example/later.png".into();
        later.blocked = true;

        fold_into_draft(&mut draft, &later);

        assert_eq!(draft.login_id, "A-1");
        assert_eq!(draft.additional_login_ids, vec!["google-2"]);
        assert_eq!(draft.custom_attributes[CONNECTION_ATTRIBUTE], json!("A,google-oauth2"));
        assert_eq!(draft.display_name, "Ann Example");
        assert_eq!(draft.picture, "https://img.example/later.png");
        assert_eq!(draft.status, AccountStatus::Disabled);
    }
}
