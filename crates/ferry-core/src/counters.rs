//! Per-phase run accumulators.
//!
//! Each phase of the engine owns one of these for its whole pass and hands it
//! to the reporter when the pass ends. Failure entries are human-readable
//! strings (`<identifier> Reason: <message>` where a reason is known).

use serde::Serialize;

/// Tallies for the user phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserCounters {
    /// Users seen by the phase, including records rejected during normalization.
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<String>,
    pub merged: Vec<String>,
    pub disabled_mismatch: Vec<String>,
    pub batches: usize,
}

/// Tallies for the password-import phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PasswordCounters {
    pub found: usize,
    pub succeeded: usize,
    pub failed: Vec<String>,
    /// Records migrated without a credential because the export had no hash.
    pub without_hash: usize,
    pub batches: usize,
}

/// Tallies for the role and permission phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounters {
    pub total: usize,
    pub created: usize,
    pub already_present: usize,
    pub failed: Vec<String>,
    /// Roles whose existence lookup failed and were created anyway.
    pub existence_checks_failed: usize,
    pub permissions_created: usize,
    pub permissions_existing: Vec<String>,
    pub permissions_failed: Vec<String>,
    /// One `Mapped N users to <role>` line per role.
    pub members_mapped: Vec<String>,
    pub member_failures: Vec<String>,
}

/// Tallies for the organization and tenant phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrgCounters {
    pub total: usize,
    pub created: usize,
    pub already_present: usize,
    pub failed: Vec<String>,
    /// Organizations whose tenant lookup failed and were created anyway.
    pub existence_checks_failed: usize,
    /// One `Associated N users with tenant: <name>` line per organization.
    pub members_associated: Vec<String>,
    pub member_failures: Vec<String>,
}

impl UserCounters {
    /// Fold another batch's tallies into this one.
    pub fn absorb(&mut self, other: Self) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed.extend(other.failed);
        self.merged.extend(other.merged);
        self.disabled_mismatch.extend(other.disabled_mismatch);
        self.batches += other.batches;
    }
}
