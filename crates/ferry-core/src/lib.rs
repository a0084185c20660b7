//! # ferry-core
//!
//! Shared vocabulary for the ferry migration workspace.
//!
//! - [`user`]: the canonical user record built once per source record.
//! - [`account`]: destination-side account shapes (loaded and drafted).
//! - [`directory`]: roles, permissions, organizations and their members.
//! - [`normalize`]: rule-driven mapping from raw source JSON to canonical records.
//! - [`existence`]: the tri-state result of remote existence checks.
//! - [`counters`]: per-phase run accumulators handed to the reporter.
//! - [`ports`]: the source and destination traits the engine drives.

pub mod account;
pub mod counters;
pub mod directory;
pub mod errors;
pub mod existence;
pub mod normalize;
pub mod ports;
pub mod user;

pub use account::{AccountDraft, AccountStatus, DestinationAccount, PasswordHash};
pub use directory::{Member, Organization, Permission, Role};
pub use errors::{CoreError, DestinationError};
pub use existence::Existence;
pub use normalize::{RawRecord, SourceShape};
pub use user::{CanonicalUser, IdentityPair};
