//! User pass: normalize, resolve, bulk-invite new accounts, merge known ones.

use std::collections::HashMap;

use ferry_core::counters::UserCounters;
use ferry_core::normalize::{first_text, normalize_user};
use ferry_core::{AccountDraft, AccountStatus, CanonicalUser, DestinationAccount, RawRecord, SourceShape};

use crate::batch::{batch_count, submit_with_retry};
use crate::progress::{Phase, report_due};
use crate::resolver::{self, Resolution};
use crate::{Migrator, RecordSet};

/// Identifier for a record that could not be normalized.
fn raw_label(record: &RawRecord) -> String {
    let label = first_text(record, &["Email", "email", "Id", "user_id"]);
    if label.is_empty() {
        "unknown".to_string()
    } else {
        label
    }
}

impl Migrator<'_> {
    /// Migrate every user in `input`.
    ///
    /// Records are chunked in input order. Within a batch, users the
    /// destination already holds are merged one by one; the rest are created
    /// with a single bulk invite that is resubmitted while rate limited.
    /// Records repeating an email already pending in the batch are folded
    /// into that pending account instead of being invited twice.
    pub async fn migrate_users(&self, input: &RecordSet) -> UserCounters {
        let total = input.len();
        let batch_size = self.options.batch_size;
        let mut counters = UserCounters {
            total: input.malformed.len(),
            failed: input.malformed.clone(),
            ..Default::default()
        };

        self.progress
            .phase_started(Phase::Users, total, self.options.dry_run);
        tracing::info!(
            total,
            batch_size = batch_size.get(),
            dry_run = self.options.dry_run,
            "starting user migration"
        );

        if self.options.dry_run {
            self.preview_users(input, &mut counters);
            self.progress.phase_finished(Phase::Users);
            return counters;
        }

        let mut processed = input.malformed.len();
        for (index, chunk) in input.records.chunks(batch_size.get()).enumerate() {
            let first = index * batch_size.get() + 1;
            if self.options.verbose {
                self.progress
                    .batch_started(Phase::Users, index + 1, first, first + chunk.len() - 1);
            }

            counters.absorb(self.migrate_user_batch(chunk, input.shape).await);

            let before = processed;
            processed += chunk.len();
            if report_due(before, processed, total) {
                self.progress
                    .progress(Phase::Users, processed, total, counters.succeeded);
            }
        }

        tracing::info!(
            succeeded = counters.succeeded,
            failed = counters.failed.len(),
            merged = counters.merged.len(),
            batches = counters.batches,
            "user migration finished"
        );
        self.progress.phase_finished(Phase::Users);
        counters
    }

    fn preview_users(&self, input: &RecordSet, counters: &mut UserCounters) {
        counters.total += input.records.len();
        counters.batches = batch_count(input.records.len(), self.options.batch_size);
        self.progress.note(&format!(
            "Would migrate {} users from Auth0 to Descope",
            input.records.len()
        ));

        for record in &input.records {
            match normalize_user(record, input.shape) {
                Ok(user) => {
                    counters.succeeded += 1;
                    if self.options.verbose {
                        self.progress
                            .note(&format!("\tUser: {}", user.display_label()));
                    }
                }
                Err(error) => counters
                    .failed
                    .push(format!("{} Reason: {error}", raw_label(record))),
            }
        }
    }

    async fn migrate_user_batch(&self, chunk: &[RawRecord], shape: SourceShape) -> UserCounters {
        let mut counters = UserCounters {
            total: chunk.len(),
            batches: 1,
            ..Default::default()
        };
        let mut drafts: Vec<AccountDraft> = Vec::new();
        let mut pending: HashMap<String, usize> = HashMap::new();
        let mut folded: Vec<String> = Vec::new();

        for record in chunk {
            let user = match normalize_user(record, shape) {
                Ok(user) => user,
                Err(error) => {
                    tracing::warn!(record = %raw_label(record), %error, "skipping user record");
                    counters
                        .failed
                        .push(format!("{} Reason: {error}", raw_label(record)));
                    continue;
                }
            };

            let key = user.email.to_lowercase();
            if let Some(&slot) = pending.get(&key) {
                resolver::fold_into_draft(&mut drafts[slot], &user);
                tracing::debug!(user = %user.label(), "folded repeated email into pending account");
                folded.push(user.label().to_string());
                continue;
            }

            match resolver::resolve(self.destination, &user).await {
                Ok(Resolution::New(draft)) => {
                    if !key.is_empty() {
                        pending.insert(key, drafts.len());
                    }
                    drafts.push(draft);
                }
                Ok(Resolution::Existing(account)) => {
                    self.merge_existing(&user, &account, &mut counters).await;
                }
                Err(error) => {
                    tracing::warn!(user = %user.label(), %error, "skipping user record");
                    counters
                        .failed
                        .push(format!("{} Reason: {error}", user.label()));
                }
            }
        }

        if !drafts.is_empty() {
            self.invite_drafts(&drafts, folded, &mut counters).await;
        }
        counters
    }

    /// Invite `drafts`; `folded` labels share their fate as merges.
    async fn invite_drafts(&self, drafts: &[AccountDraft], folded: Vec<String>, counters: &mut UserCounters) {
        let result = submit_with_retry(&self.options.batch_retry, || {
            self.destination.invite_batch(drafts)
        })
        .await;

        match result {
            Ok(()) => {
                counters.succeeded += drafts.len();
                counters.merged.extend(folded);
                for draft in drafts.iter().filter(|draft| draft.status.is_disabled()) {
                    if let Err(error) = self
                        .destination
                        .set_status(&draft.login_id, AccountStatus::Disabled)
                        .await
                    {
                        tracing::error!(login_id = %draft.login_id, %error, "unable to deactivate blocked user");
                    }
                }
            }
            Err(error) => {
                counters.failed.extend(
                    drafts
                        .iter()
                        .map(|draft| draft.label())
                        .chain(folded.iter().map(String::as_str))
                        .map(|label| format!("{label} Reason: {error}")),
                );
            }
        }
    }

    /// Fold `user` into the account the destination already holds for its email.
    async fn merge_existing(
        &self,
        user: &CanonicalUser,
        account: &DestinationAccount,
        counters: &mut UserCounters,
    ) {
        let plan = resolver::plan_merge(user, account);

        if let Some(update) = &plan.update {
            if let Err(error) = self.destination.update_user(update).await {
                tracing::error!(user = %user.label(), %error, "unable to merge user");
                counters
                    .failed
                    .push(format!("{} Reason: {error}", user.label()));
                return;
            }
            tracing::debug!(user = %user.label(), login_id = %plan.login_id, "merged new connections");
        }

        if let Some(status) = plan.status_change
            && let Err(error) = self.destination.set_status(&plan.login_id, status).await
        {
            tracing::error!(login_id = %plan.login_id, %error, "unable to update user status");
        }

        if plan.disabled_mismatch {
            counters.disabled_mismatch.push(user.label().to_string());
        }
        counters.merged.push(user.label().to_string());
    }
}
