//! Source and destination seams.
//!
//! The engine only talks to providers through these traits. Implementations
//! are constructed once by the binary and passed down by reference.

use async_trait::async_trait;

use crate::account::{AccountDraft, AccountStatus, DestinationAccount};
use crate::directory::{Member, Organization, Permission, Role};
use crate::errors::DestinationError;
use crate::existence::Existence;
use crate::normalize::RawRecord;

/// Read-only, paginated access to the source provider.
///
/// Every method returns whatever could be fetched: a failing page ends the
/// listing early and is logged by the implementation, never raised.
#[async_trait]
pub trait SourceDirectory: Send + Sync {
    /// Raw user records in [`crate::SourceShape::Api`] shape.
    async fn users(&self) -> Vec<RawRecord>;
    async fn roles(&self) -> Vec<Role>;
    async fn role_permissions(&self, role_id: &str) -> Vec<Permission>;
    async fn role_members(&self, role_id: &str) -> Vec<Member>;
    async fn organizations(&self) -> Vec<Organization>;
    async fn organization_members(&self, organization_id: &str) -> Vec<Member>;
}

/// Mutating and lookup calls against the destination provider.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Exact-match account lookup by email.
    async fn find_user_by_email(&self, email: &str) -> Existence<DestinationAccount>;

    /// Update an existing account addressed by `draft.login_id`.
    async fn update_user(&self, draft: &AccountDraft) -> Result<(), DestinationError>;

    async fn set_status(&self, login_id: &str, status: AccountStatus) -> Result<(), DestinationError>;

    /// Create every draft in one bulk call without sending invitations.
    async fn invite_batch(&self, drafts: &[AccountDraft]) -> Result<(), DestinationError>;

    async fn create_permission(&self, permission: &Permission) -> Result<(), DestinationError>;

    async fn role_exists(&self, name: &str) -> Existence;

    async fn create_role(&self, role: &Role) -> Result<(), DestinationError>;

    async fn add_roles(&self, login_id: &str, role_names: &[String]) -> Result<(), DestinationError>;

    async fn tenant_exists(&self, tenant_id: &str) -> Existence;

    async fn create_tenant(&self, organization: &Organization) -> Result<(), DestinationError>;

    async fn add_tenant(&self, login_id: &str, tenant_id: &str) -> Result<(), DestinationError>;
}
