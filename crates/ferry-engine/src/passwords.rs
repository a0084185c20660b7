//! Password-import pass.
//!
//! Every export record becomes one account addressed by its email and tagged
//! with the password database connection, carrying the exported bcrypt hash
//! when there is one. Batches go through the same bulk invite and retry path
//! as the user pass but are counted separately.

use ferry_core::account::{CONNECTION_ATTRIBUTE, FRESHLY_MIGRATED_ATTRIBUTE};
use ferry_core::counters::PasswordCounters;
use ferry_core::normalize::{first_text, normalize_user};
use ferry_core::{AccountDraft, AccountStatus, CoreError, PasswordHash, RawRecord, SourceShape};
use serde_json::{Map, Value};

use crate::batch::{batch_count, submit_with_retry};
use crate::progress::{Phase, report_due};
use crate::{Migrator, RecordSet};

/// Connection every password account is attributed to.
pub const PASSWORD_CONNECTION: &str = "Username-Password-Authentication";

const EMAIL_KEYS: &[&str] = &["Email", "email"];
const HASH_KEYS: &[&str] = &["passwordHash", "password_hash"];

/// Build the account for one password export record.
///
/// The returned flag is `false` when the record had no hash and the account
/// will be created without a credential.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] when the record has no email.
pub fn password_draft(record: &RawRecord) -> Result<(AccountDraft, bool), CoreError> {
    let email = first_text(record, EMAIL_KEYS);
    if email.is_empty() {
        return Err(CoreError::Validation("password record has no email".to_string()));
    }
    let user = normalize_user(record, SourceShape::File)?;
    let hash = first_text(record, HASH_KEYS);
    let has_hash = !hash.is_empty();

    let mut attributes = Map::new();
    attributes.insert(
        CONNECTION_ATTRIBUTE.to_string(),
        Value::String(PASSWORD_CONNECTION.to_string()),
    );
    attributes.insert(FRESHLY_MIGRATED_ATTRIBUTE.to_string(), Value::Bool(true));

    let display_name = [&user.name, &user.nickname, &email]
        .into_iter()
        .find(|value| !value.is_empty())
        .cloned()
        .unwrap_or_default();

    let draft = AccountDraft {
        login_id: email.clone(),
        additional_login_ids: Vec::new(),
        email,
        display_name,
        given_name: user.given_name,
        family_name: user.family_name,
        phone: user.phone_number,
        picture: user.picture,
        custom_attributes: attributes,
        verified_email: true,
        verified_phone: false,
        password: has_hash.then_some(PasswordHash::Bcrypt(hash)),
        status: AccountStatus::Enabled,
    };
    Ok((draft, has_hash))
}

impl Migrator<'_> {
    /// Create accounts, with their password hashes, from an export file.
    pub async fn migrate_passwords(&self, input: &RecordSet) -> PasswordCounters {
        let total = input.len();
        let batch_size = self.options.batch_size;
        let mut counters = PasswordCounters {
            found: total,
            failed: input.malformed.clone(),
            ..Default::default()
        };

        self.progress
            .phase_started(Phase::Passwords, total, self.options.dry_run);

        if self.options.dry_run {
            counters.batches = batch_count(input.records.len(), batch_size);
            self.progress.note(&format!(
                "Would migrate {} users from Auth0 with Passwords to Descope",
                input.records.len()
            ));
            for record in &input.records {
                let email = first_text(record, EMAIL_KEYS);
                if email.is_empty() {
                    counters.failed.push("unknown".to_string());
                } else {
                    counters.succeeded += 1;
                }
                if self.options.verbose {
                    let label = if email.is_empty() { "unknown" } else { email.as_str() };
                    self.progress.note(&format!("\tuser: {label}"));
                }
            }
            self.progress.phase_finished(Phase::Passwords);
            return counters;
        }

        let mut processed = input.malformed.len();
        for (index, chunk) in input.records.chunks(batch_size.get()).enumerate() {
            let first = index * batch_size.get() + 1;
            if self.options.verbose {
                self.progress
                    .batch_started(Phase::Passwords, index + 1, first, first + chunk.len() - 1);
            }
            counters.batches += 1;

            let mut drafts = Vec::with_capacity(chunk.len());
            for record in chunk {
                match password_draft(record) {
                    Ok((draft, has_hash)) => {
                        if !has_hash {
                            tracing::warn!(email = %draft.email, "migrating user without password hash");
                            counters.without_hash += 1;
                        }
                        drafts.push(draft);
                    }
                    Err(error) => {
                        tracing::warn!(%error, "skipping password record");
                        let id = first_text(record, &["Id", "user_id"]);
                        counters
                            .failed
                            .push(if id.is_empty() { "unknown".to_string() } else { id });
                    }
                }
            }

            if !drafts.is_empty() {
                let result = submit_with_retry(&self.options.batch_retry, || {
                    self.destination.invite_batch(&drafts)
                })
                .await;
                match result {
                    Ok(()) => counters.succeeded += drafts.len(),
                    Err(error) => counters.failed.extend(
                        drafts
                            .iter()
                            .map(|draft| format!("{} Reason: {error}", draft.email)),
                    ),
                }
            }

            let before = processed;
            processed += chunk.len();
            if report_due(before, processed, total) {
                self.progress
                    .progress(Phase::Passwords, processed, total, counters.succeeded);
            }
        }

        tracing::info!(
            found = counters.found,
            succeeded = counters.succeeded,
            failed = counters.failed.len(),
            without_hash = counters.without_hash,
            "password migration finished"
        );
        self.progress.phase_finished(Phase::Passwords);
        counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn draft_carries_bcrypt_hash() {
        let (draft, has_hash) = password_draft(&record(json!({
            "email": "ann@example.com",
            "passwordHash": "$2b$10$abcdef",
            "name": "Ann",
            "email_verified": false
        })))
        .unwrap();
        assert!(has_hash);
        assert_eq!(draft.login_id, "ann@example.com");
        assert!(draft.additional_login_ids.is_empty());
        assert!(draft.verified_email);
        assert_eq!(draft.display_name, "Ann");
        assert_eq!(draft.password, Some(PasswordHash::Bcrypt("$2b$10$abcdef".into())));
        assert_eq!(draft.custom_attributes[CONNECTION_ATTRIBUTE], json!(PASSWORD_CONNECTION));
    }

    #[test]
    fn missing_hash_still_builds_account() {
        let (draft, has_hash) = password_draft(&record(json!({"Email": "bob@example.com"}))).unwrap();
        assert!(!has_hash);
        assert_eq!(draft.password, None);
        assert_eq!(draft.display_name, "bob@example.com");
    }

    #[test]
    fn missing_email_is_rejected() {
        let result = password_draft(&record(json!({"user_id": "auth0|1", "passwordHash": "x"})));
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }
}
