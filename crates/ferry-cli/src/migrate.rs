//! One migration run: passwords, users, roles, then organizations.
//!
//! Only a missing Descope client stops the run. An unreadable file or absent
//! Auth0 credentials skip the phases that need them, and the summary shows
//! those phases as skipped.

use std::path::Path;

use ferry_auth0::read_export;
use ferry_config::FerryConfig;
use ferry_core::SourceShape;
use ferry_core::ports::SourceDirectory;
use ferry_engine::{Migrator, ProgressSink, RecordSet, RunReport};

use crate::bootstrap;
use crate::cli::Cli;
use crate::progress::TerminalProgress;

/// Read an NDJSON export into a record set, logging and printing on failure.
fn export_records(path: &Path, progress: &dyn ProgressSink) -> Option<RecordSet> {
    match read_export(path) {
        Ok(export) => {
            for line in &export.malformed {
                tracing::warn!(file = %path.display(), %line, "skipping malformed export line");
            }
            Some(RecordSet::new(export.records, SourceShape::File).with_malformed(export.malformed))
        }
        Err(error) => {
            tracing::error!(%error, "unable to read export file");
            progress.note(&format!("Skipping {}: {error}", path.display()));
            None
        }
    }
}

pub async fn run(cli: &Cli, config: &FerryConfig) -> anyhow::Result<RunReport> {
    let destination = bootstrap::descope_client(config)?;
    let options = bootstrap::migration_options(cli, config)?;
    let source = if cli.needs_api() {
        bootstrap::auth0_client(config)?
    } else {
        None
    };

    let progress = TerminalProgress::new();
    println!("Using batch size: {}", options.batch_size);
    if cli.skip_roles {
        println!("Skipping roles and permissions migration");
    }
    if cli.skip_orgs {
        println!("Skipping organizations/tenants migration");
    }

    let migrator = Migrator::new(&destination, options).with_progress(&progress);
    let mut report = RunReport::new(cli.dry_run);

    if let Some(path) = &cli.with_passwords {
        println!("Running with passwords from file: {}", path.display());
        if let Some(records) = export_records(path, &progress) {
            report.passwords = Some(migrator.migrate_passwords(&records).await);
        }
    }

    report.users = match (&cli.from_json, &source) {
        (Some(path), _) => match export_records(path, &progress) {
            Some(records) => Some(migrator.migrate_users(&records).await),
            None => None,
        },
        (None, Some(auth0)) => {
            let records = RecordSet::new(auth0.users().await, SourceShape::Api);
            Some(migrator.migrate_users(&records).await)
        }
        (None, None) => None,
    };

    if let Some(auth0) = &source {
        if !cli.skip_roles {
            report.roles = Some(migrator.migrate_roles(auth0).await);
        }
        if !cli.skip_orgs {
            report.organizations = Some(migrator.migrate_organizations(auth0).await);
        }
    }

    Ok(report)
}
