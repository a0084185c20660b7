//! In-memory source and destination used by the engine tests.
//!
//! The destination keeps accounts keyed by email so repeated runs see what
//! earlier runs created, and records every call so tests can count them.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ferry_core::errors::DUPLICATE_PERMISSION_CODE;
use ferry_core::ports::{Destination, SourceDirectory};
use ferry_core::{
    AccountDraft, AccountStatus, DestinationAccount, DestinationError, Existence, Member, Organization,
    Permission, RawRecord, Role,
};
use ferry_engine::{BatchRetryPolicy, MigrationOptions, Phase, ProgressSink};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FindUser(String),
    UpdateUser(String),
    SetStatus(String, AccountStatus),
    InviteBatch(usize),
    CreatePermission(String),
    RoleExists(String),
    CreateRole(String),
    AddRoles(String, Vec<String>),
    TenantExists(String),
    CreateTenant(String),
    AddTenant(String, String),
}

impl Call {
    pub const fn is_mutating(&self) -> bool {
        !matches!(self, Self::FindUser(_) | Self::RoleExists(_) | Self::TenantExists(_))
    }
}

#[derive(Default)]
pub struct FakeDestination {
    accounts: Mutex<BTreeMap<String, DestinationAccount>>,
    calls: Mutex<Vec<Call>>,
    invite_script: Mutex<VecDeque<Result<(), DestinationError>>>,
    permissions: Mutex<BTreeSet<String>>,
    roles: Mutex<BTreeSet<String>>,
    tenants: Mutex<BTreeSet<String>>,
    failing_role_checks: BTreeSet<String>,
    rejected_logins: BTreeSet<String>,
}

impl FakeDestination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, account: DestinationAccount) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .insert(account.email.to_lowercase(), account);
        self
    }

    pub fn with_permission(self, name: &str) -> Self {
        self.permissions.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn with_role(self, name: &str) -> Self {
        self.roles.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn with_tenant(self, id: &str) -> Self {
        self.tenants.lock().unwrap().insert(id.to_string());
        self
    }

    pub fn with_failing_role_check(mut self, name: &str) -> Self {
        self.failing_role_checks.insert(name.to_string());
        self
    }

    pub fn rejecting_login(mut self, login_id: &str) -> Self {
        self.rejected_logins.insert(login_id.to_string());
        self
    }

    /// Outcomes for successive bulk invites; once exhausted, invites succeed.
    pub fn script_invites(self, outcomes: Vec<Result<(), DestinationError>>) -> Self {
        *self.invite_script.lock().unwrap() = outcomes.into();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    pub fn account(&self, email: &str) -> Option<DestinationAccount> {
        self.accounts.lock().unwrap().get(&email.to_lowercase()).cloned()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn store_draft(&self, draft: &AccountDraft) {
        let mut login_ids = vec![draft.login_id.clone()];
        login_ids.extend(draft.additional_login_ids.iter().cloned());
        let account = DestinationAccount {
            login_ids,
            email: draft.email.clone(),
            verified_email: draft.verified_email,
            verified_phone: draft.verified_phone,
            name: draft.display_name.clone(),
            given_name: draft.given_name.clone(),
            family_name: draft.family_name.clone(),
            picture: draft.picture.clone(),
            phone: draft.phone.clone(),
            custom_attributes: draft.custom_attributes.clone(),
            status: AccountStatus::Enabled,
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(draft.email.to_lowercase(), account);
    }

    fn by_login_id(&self, login_id: &str) -> Option<String> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|(_, account)| account.login_ids.iter().any(|id| id == login_id))
            .map(|(key, _)| key.clone())
    }
}

#[async_trait]
impl Destination for FakeDestination {
    async fn find_user_by_email(&self, email: &str) -> Existence<DestinationAccount> {
        self.record(Call::FindUser(email.to_string()));
        match self.account(email) {
            Some(account) => Existence::Exists(account),
            None => Existence::Absent,
        }
    }

    async fn update_user(&self, draft: &AccountDraft) -> Result<(), DestinationError> {
        self.record(Call::UpdateUser(draft.login_id.clone()));
        let Some(key) = self.by_login_id(&draft.login_id) else {
            return Err(DestinationError::new("user not found").with_status(404));
        };
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.get_mut(&key) {
            let mut login_ids = vec![draft.login_id.clone()];
            login_ids.extend(draft.additional_login_ids.iter().cloned());
            account.login_ids = login_ids;
            account.name = draft.display_name.clone();
            account.given_name = draft.given_name.clone();
            account.family_name = draft.family_name.clone();
            account.picture = draft.picture.clone();
            account.custom_attributes = draft.custom_attributes.clone();
        }
        Ok(())
    }

    async fn set_status(&self, login_id: &str, status: AccountStatus) -> Result<(), DestinationError> {
        self.record(Call::SetStatus(login_id.to_string(), status));
        let Some(key) = self.by_login_id(login_id) else {
            return Err(DestinationError::new("user not found").with_status(404));
        };
        if let Some(account) = self.accounts.lock().unwrap().get_mut(&key) {
            account.status = status;
        }
        Ok(())
    }

    async fn invite_batch(&self, drafts: &[AccountDraft]) -> Result<(), DestinationError> {
        self.record(Call::InviteBatch(drafts.len()));
        let outcome = self.invite_script.lock().unwrap().pop_front().unwrap_or(Ok(()));
        outcome?;
        for draft in drafts {
            self.store_draft(draft);
        }
        Ok(())
    }

    async fn create_permission(&self, permission: &Permission) -> Result<(), DestinationError> {
        self.record(Call::CreatePermission(permission.name.clone()));
        if self.permissions.lock().unwrap().insert(permission.name.clone()) {
            Ok(())
        } else {
            Err(DestinationError::new("Permission already exists")
                .with_code(DUPLICATE_PERMISSION_CODE)
                .with_status(400))
        }
    }

    async fn role_exists(&self, name: &str) -> Existence {
        self.record(Call::RoleExists(name.to_string()));
        if self.failing_role_checks.contains(name) {
            return Existence::CheckFailed("request timed out".to_string());
        }
        if self.roles.lock().unwrap().contains(name) {
            Existence::Exists(())
        } else {
            Existence::Absent
        }
    }

    async fn create_role(&self, role: &Role) -> Result<(), DestinationError> {
        self.record(Call::CreateRole(role.name.clone()));
        self.roles.lock().unwrap().insert(role.name.clone());
        Ok(())
    }

    async fn add_roles(&self, login_id: &str, role_names: &[String]) -> Result<(), DestinationError> {
        self.record(Call::AddRoles(login_id.to_string(), role_names.to_vec()));
        if self.rejected_logins.contains(login_id) {
            return Err(DestinationError::new("User not found").with_code("E112102"));
        }
        Ok(())
    }

    async fn tenant_exists(&self, tenant_id: &str) -> Existence {
        self.record(Call::TenantExists(tenant_id.to_string()));
        if self.tenants.lock().unwrap().contains(tenant_id) {
            Existence::Exists(())
        } else {
            Existence::Absent
        }
    }

    async fn create_tenant(&self, organization: &Organization) -> Result<(), DestinationError> {
        self.record(Call::CreateTenant(organization.id.clone()));
        self.tenants.lock().unwrap().insert(organization.id.clone());
        Ok(())
    }

    async fn add_tenant(&self, login_id: &str, tenant_id: &str) -> Result<(), DestinationError> {
        self.record(Call::AddTenant(login_id.to_string(), tenant_id.to_string()));
        if self.rejected_logins.contains(login_id) {
            return Err(DestinationError::new("User not found").with_code("E112102"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSource {
    pub users: Vec<RawRecord>,
    pub roles: Vec<Role>,
    pub permissions: BTreeMap<String, Vec<Permission>>,
    pub role_members: BTreeMap<String, Vec<Member>>,
    pub organizations: Vec<Organization>,
    pub organization_members: BTreeMap<String, Vec<Member>>,
}

#[async_trait]
impl SourceDirectory for FakeSource {
    async fn users(&self) -> Vec<RawRecord> {
        self.users.clone()
    }

    async fn roles(&self) -> Vec<Role> {
        self.roles.clone()
    }

    async fn role_permissions(&self, role_id: &str) -> Vec<Permission> {
        self.permissions.get(role_id).cloned().unwrap_or_default()
    }

    async fn role_members(&self, role_id: &str) -> Vec<Member> {
        self.role_members.get(role_id).cloned().unwrap_or_default()
    }

    async fn organizations(&self) -> Vec<Organization> {
        self.organizations.clone()
    }

    async fn organization_members(&self, organization_id: &str) -> Vec<Member> {
        self.organization_members
            .get(organization_id)
            .cloned()
            .unwrap_or_default()
    }
}

/// Progress sink that keeps every note and progress event.
#[derive(Default)]
pub struct RecordingSink {
    pub notes: Mutex<Vec<String>>,
    pub progress: Mutex<Vec<(Phase, usize, usize)>>,
    pub batches: Mutex<Vec<(usize, usize, usize)>>,
}

impl ProgressSink for RecordingSink {
    fn batch_started(&self, _phase: Phase, index: usize, first: usize, last: usize) {
        self.batches.lock().unwrap().push((index, first, last));
    }

    fn progress(&self, phase: Phase, processed: usize, total: usize, _succeeded: usize) {
        self.progress.lock().unwrap().push((phase, processed, total));
    }

    fn note(&self, line: &str) {
        self.notes.lock().unwrap().push(line.to_string());
    }
}

impl RecordingSink {
    pub fn notes(&self) -> Vec<String> {
        self.notes.lock().unwrap().clone()
    }
}

/// Options that never sleep.
pub fn options(batch_size: usize) -> MigrationOptions {
    MigrationOptions {
        batch_size: std::num::NonZeroUsize::new(batch_size).unwrap(),
        batch_retry: BatchRetryPolicy {
            max_retries: 3,
            backoff: Duration::ZERO,
        },
        ..Default::default()
    }
}

pub fn record(value: Value) -> RawRecord {
    value.as_object().cloned().unwrap()
}

/// An API-shaped user with one identity per `(connection, external id)`.
pub fn api_user(email: &str, identities: &[(&str, &str)]) -> RawRecord {
    let identities: Vec<Value> = identities
        .iter()
        .map(|(connection, user_id)| {
            json!({"connection": connection, "user_id": user_id, "provider": connection})
        })
        .collect();
    record(json!({
        "user_id": format!("auth0|{email}"),
        "email": email,
        "email_verified": true,
        "name": email,
        "identities": identities,
    }))
}

/// An export-file-shaped user.
pub fn file_user(index: usize) -> RawRecord {
    record(json!({
        "Id": format!("auth0|{index}"),
        "Email": format!("user{index}@example.com"),
        "Name": format!("User {index}"),
    }))
}

pub fn member(user_id: &str, email: &str) -> Member {
    Member {
        user_id: user_id.to_string(),
        email: email.to_string(),
    }
}

pub fn rate_limited() -> DestinationError {
    DestinationError::new("Rate limit exceeded")
        .with_code("E130429")
        .with_status(429)
}
