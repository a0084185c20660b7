//! Organization pass: tenants, then tenant membership.

use ferry_core::counters::OrgCounters;
use ferry_core::ports::SourceDirectory;
use ferry_core::{Existence, Organization};

use crate::Migrator;
use crate::progress::Phase;

impl Migrator<'_> {
    /// Create a tenant per source organization and associate its members.
    pub async fn migrate_organizations(&self, source: &dyn SourceDirectory) -> OrgCounters {
        let organizations = source.organizations().await;
        let total = organizations.len();
        let mut counters = OrgCounters {
            total,
            ..Default::default()
        };
        self.progress
            .phase_started(Phase::Organizations, total, self.options.dry_run);

        if self.options.dry_run {
            counters.created = total;
            self.progress.note(&format!(
                "Would migrate {total} organizations from Auth0 to Descope"
            ));
            if self.options.verbose {
                for organization in &organizations {
                    let members = source.organization_members(&organization.id).await;
                    self.progress.note(&format!(
                        "\tOrganization: {} with {} associated users",
                        organization.label(),
                        members.len()
                    ));
                }
            }
            self.progress.phase_finished(Phase::Organizations);
            return counters;
        }

        for (index, organization) in organizations.iter().enumerate() {
            let created = self.ensure_tenant(organization, &mut counters).await;

            let members = source.organization_members(&organization.id).await;
            if self.options.verbose {
                self.progress.note(&format!(
                    "\tOrganization: {} with {} associated users",
                    organization.label(),
                    members.len()
                ));
            }

            let mut added = 0;
            for member in &members {
                if member.email.is_empty() {
                    tracing::warn!(user = %member.user_id, tenant = %organization.id, "member has no email; not adding to tenant");
                    counters.member_failures.push(format!(
                        "User {} failed to be added to tenant {} Reason: no email",
                        member.user_id,
                        organization.label()
                    ));
                    continue;
                }
                match self.destination.add_tenant(&member.email, &organization.id).await {
                    Ok(()) => added += 1,
                    Err(error) => {
                        tracing::error!(user = %member.email, tenant = %organization.id, %error, "unable to add user to tenant");
                        counters.member_failures.push(format!(
                            "User {} failed to be added to tenant {} Reason: {error}",
                            member.email,
                            organization.label()
                        ));
                    }
                }
            }
            counters.members_associated.push(format!(
                "Associated {added} users with tenant: {}",
                organization.label()
            ));

            if created {
                self.still_working(counters.created, "organizations");
            }
            self.progress
                .progress(Phase::Organizations, index + 1, total, counters.created);
        }

        tracing::info!(
            created = counters.created,
            already_present = counters.already_present,
            failed = counters.failed.len(),
            "organization migration finished"
        );
        self.progress.phase_finished(Phase::Organizations);
        counters
    }

    /// Create the tenant unless it exists. Returns whether it was created.
    async fn ensure_tenant(&self, organization: &Organization, counters: &mut OrgCounters) -> bool {
        match self.destination.tenant_exists(&organization.id).await {
            Existence::Exists(()) => {
                counters.already_present += 1;
                return false;
            }
            Existence::Absent => {}
            Existence::CheckFailed(reason) => {
                tracing::warn!(tenant = %organization.id, %reason, "tenant lookup failed; attempting create");
                counters.existence_checks_failed += 1;
            }
        }

        match self.destination.create_tenant(organization).await {
            Ok(()) => {
                counters.created += 1;
                true
            }
            Err(error) => {
                tracing::error!(tenant = %organization.id, %error, "unable to create tenant");
                counters.failed.push(format!(
                    "Tenant {} failed to create Reason: {error}",
                    organization.label()
                ));
                false
            }
        }
    }
}
