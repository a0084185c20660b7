//! End-of-run summary.
//!
//! The report only formats the counters the passes returned; it never
//! derives numbers of its own. A phase that did not run is `None` and shows
//! up as skipped.

use std::fmt;

use ferry_core::counters::{OrgCounters, PasswordCounters, RoleCounters, UserCounters};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub passwords: Option<PasswordCounters>,
    pub users: Option<UserCounters>,
    pub roles: Option<RoleCounters>,
    pub organizations: Option<OrgCounters>,
}

impl RunReport {
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Per-item listings (failures, merges, memberships) for verbose output.
    #[must_use]
    pub const fn details(&self) -> Details<'_> {
        Details(self)
    }
}

fn skipped(f: &mut fmt::Formatter<'_>, label: &str) -> fmt::Result {
    writeln!(f, "{label}: skipped")
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.dry_run { "to migrate" } else { "migrated" };
        if self.dry_run {
            writeln!(f, "=== Dry Run Summary ===")?;
        } else {
            writeln!(f, "=== Migration Summary ===")?;
        }

        match &self.users {
            Some(users) => {
                writeln!(f, "Total users {verb}: {}", users.succeeded)?;
                writeln!(f, "Failed users: {}", users.failed.len())?;
                writeln!(f, "Merged users: {}", users.merged.len())?;
                writeln!(f, "Disabled status mismatches: {}", users.disabled_mismatch.len())?;
                writeln!(f, "User batches: {}", users.batches)?;
            }
            None => skipped(f, "Users")?,
        }

        match &self.passwords {
            Some(passwords) => {
                writeln!(f, "Users with passwords: {}/{}", passwords.succeeded, passwords.found)?;
                if passwords.without_hash > 0 {
                    writeln!(f, "Users migrated without a password hash: {}", passwords.without_hash)?;
                }
            }
            None => skipped(f, "Users with passwords")?,
        }

        match &self.roles {
            Some(roles) => {
                writeln!(f, "Roles {verb}: {}", roles.created)?;
                writeln!(f, "Roles already present: {}", roles.already_present)?;
                writeln!(f, "Failed roles: {}", roles.failed.len())?;
                writeln!(f, "Permissions created: {}", roles.permissions_created)?;
                writeln!(f, "Permissions already present: {}", roles.permissions_existing.len())?;
                writeln!(f, "Failed permissions: {}", roles.permissions_failed.len())?;
            }
            None => skipped(f, "Roles")?,
        }

        match &self.organizations {
            Some(organizations) => {
                writeln!(f, "Organizations {verb}: {}", organizations.created)?;
                writeln!(f, "Organizations already present: {}", organizations.already_present)?;
                writeln!(f, "Failed organizations: {}", organizations.failed.len())?;
            }
            None => skipped(f, "Organizations")?,
        }
        Ok(())
    }
}

/// Verbose listing of a [`RunReport`].
pub struct Details<'a>(&'a RunReport);

fn list(f: &mut fmt::Formatter<'_>, heading: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f, "{heading}:")?;
    for item in items {
        writeln!(f, "\t{item}")?;
    }
    Ok(())
}

impl fmt::Display for Details<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        if let Some(passwords) = &report.passwords {
            list(f, "Failed users with passwords", &passwords.failed)?;
        }
        if let Some(users) = &report.users {
            list(f, "Failed users", &users.failed)?;
            list(f, "Merged users", &users.merged)?;
            list(f, "Users with disabled status mismatch", &users.disabled_mismatch)?;
        }
        if let Some(roles) = &report.roles {
            list(f, "Failed roles", &roles.failed)?;
            list(f, "Permissions already present", &roles.permissions_existing)?;
            list(f, "Failed permissions", &roles.permissions_failed)?;
            list(f, "Role assignments", &roles.members_mapped)?;
            list(f, "Failed role assignments", &roles.member_failures)?;
        }
        if let Some(organizations) = &report.organizations {
            list(f, "Failed tenants", &organizations.failed)?;
            list(f, "Tenant associations", &organizations.members_associated)?;
            list(f, "Failed tenant associations", &organizations.member_failures)?;
        }
        Ok(())
    }
}
