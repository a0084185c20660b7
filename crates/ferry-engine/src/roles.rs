//! Role pass: permissions, roles, then role membership.

use std::slice;

use ferry_core::counters::RoleCounters;
use ferry_core::ports::SourceDirectory;
use ferry_core::{Existence, Permission, Role};

use crate::Migrator;
use crate::progress::Phase;

impl Migrator<'_> {
    /// Migrate every source role with its permissions and members.
    ///
    /// Each role is handled on its own: a failed permission, role or member
    /// association is recorded and the pass moves on.
    pub async fn migrate_roles(&self, source: &dyn SourceDirectory) -> RoleCounters {
        let roles = source.roles().await;
        let mut counters = RoleCounters {
            total: roles.len(),
            ..Default::default()
        };
        self.progress
            .phase_started(Phase::Roles, roles.len(), self.options.dry_run);

        if self.options.dry_run {
            counters.created = roles.len();
            self.progress.note(&format!(
                "Would migrate {} roles from Auth0 to Descope",
                roles.len()
            ));
            if self.options.verbose {
                for role in &roles {
                    let permissions = source.role_permissions(&role.source_id).await;
                    self.progress.note(&format!(
                        "\tRole: {} with {} associated permissions",
                        role.name,
                        permissions.len()
                    ));
                }
            }
            self.progress.phase_finished(Phase::Roles);
            return counters;
        }

        for (index, role) in roles.iter().enumerate() {
            let permissions = source.role_permissions(&role.source_id).await;
            if self.options.verbose {
                self.progress.note(&format!(
                    "\tRole: {} with {} associated permissions",
                    role.name,
                    permissions.len()
                ));
            }

            let attached = self.create_permissions(&permissions, &mut counters).await;
            let role = Role {
                permission_names: attached,
                ..role.clone()
            };
            let created = self.ensure_role(&role, &mut counters).await;

            let members = source.role_members(&role.source_id).await;
            let mut added = 0;
            for member in &members {
                if member.email.is_empty() {
                    tracing::warn!(user = %member.user_id, role = %role.name, "member has no email; not adding role");
                    counters.member_failures.push(format!(
                        "{} failed to be added to {} Reason: no email",
                        member.user_id, role.name
                    ));
                    continue;
                }
                match self
                    .destination
                    .add_roles(&member.email, slice::from_ref(&role.name))
                    .await
                {
                    Ok(()) => added += 1,
                    Err(error) => {
                        tracing::error!(user = %member.user_id, role = %role.name, %error, "unable to add role to user");
                        counters.member_failures.push(format!(
                            "{} failed to be added to {} Reason: {error}",
                            member.user_id, role.name
                        ));
                    }
                }
            }
            counters
                .members_mapped
                .push(format!("Mapped {added} users to {}", role.name));

            if created {
                self.still_working(counters.created, "roles");
            }
            self.progress
                .progress(Phase::Roles, index + 1, roles.len(), counters.created);
        }

        tracing::info!(
            created = counters.created,
            already_present = counters.already_present,
            failed = counters.failed.len(),
            permissions_created = counters.permissions_created,
            "role migration finished"
        );
        self.progress.phase_finished(Phase::Roles);
        counters
    }

    /// Create each permission and return the names to attach to the role.
    ///
    /// Names the destination already has are attached too.
    async fn create_permissions(&self, permissions: &[Permission], counters: &mut RoleCounters) -> Vec<String> {
        let mut attached = Vec::with_capacity(permissions.len());
        for permission in permissions {
            match self.destination.create_permission(permission).await {
                Ok(()) => {
                    counters.permissions_created += 1;
                    attached.push(permission.name.clone());
                }
                Err(error) if error.is_already_exists() => {
                    tracing::debug!(permission = %permission.name, "permission already exists");
                    if !counters.permissions_existing.contains(&permission.name) {
                        counters.permissions_existing.push(permission.name.clone());
                    }
                    attached.push(permission.name.clone());
                }
                Err(error) => {
                    tracing::error!(permission = %permission.name, %error, "unable to create permission");
                    counters
                        .permissions_failed
                        .push(format!("{}, Reason: {error}", permission.name));
                }
            }
        }
        attached
    }

    /// Create the role unless it exists. Returns whether it was created.
    async fn ensure_role(&self, role: &Role, counters: &mut RoleCounters) -> bool {
        match self.destination.role_exists(&role.name).await {
            Existence::Exists(()) => {
                tracing::debug!(role = %role.name, "role already exists");
                counters.already_present += 1;
                return false;
            }
            Existence::Absent => {}
            Existence::CheckFailed(reason) => {
                tracing::warn!(role = %role.name, %reason, "role lookup failed; attempting create");
                counters.existence_checks_failed += 1;
            }
        }

        match self.destination.create_role(role).await {
            Ok(()) => {
                counters.created += 1;
                true
            }
            Err(error) => {
                tracing::error!(role = %role.name, %error, "unable to create role");
                counters
                    .failed
                    .push(format!("{} Reason: {error}", role.name));
                false
            }
        }
    }
}
