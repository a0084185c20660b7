//! # ferry-engine
//!
//! Drives canonical records through a [`Destination`] in batches.
//!
//! A [`Migrator`] is built once per run around the destination client and
//! runs up to four independent passes, each returning its own counters:
//!
//! - [`Migrator::migrate_passwords`]: export records carrying bcrypt hashes.
//! - [`Migrator::migrate_users`]: users from the API or an export file,
//!   merged into existing accounts where the email is already known.
//! - [`Migrator::migrate_roles`]: permissions, roles and role membership.
//! - [`Migrator::migrate_organizations`]: tenants and tenant membership.
//!
//! Nothing a single record or batch does can fail a pass; failures end up in
//! the counters and the [`report::RunReport`] built from them.

pub mod batch;
pub mod passwords;
pub mod progress;
pub mod report;
pub mod resolver;

mod orgs;
mod roles;
mod users;

use std::num::NonZeroUsize;

use ferry_core::ports::Destination;
use ferry_core::{RawRecord, SourceShape};

pub use batch::BatchRetryPolicy;
pub use progress::{NoProgress, Phase, ProgressSink};
pub use report::RunReport;
pub use resolver::{MergePlan, Resolution};

const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(50).unwrap();

/// Run-wide switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOptions {
    /// Read and normalize everything but issue no destination calls.
    pub dry_run: bool,
    pub verbose: bool,
    /// Records per bulk create call.
    pub batch_size: NonZeroUsize,
    pub batch_retry: BatchRetryPolicy,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            verbose: false,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_retry: BatchRetryPolicy::default(),
        }
    }
}

/// Raw records handed to a user pass, plus the lines that never decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    pub records: Vec<RawRecord>,
    pub shape: SourceShape,
    /// Undecodable input lines; each is counted as a failed record.
    pub malformed: Vec<String>,
}

impl RecordSet {
    #[must_use]
    pub const fn new(records: Vec<RawRecord>, shape: SourceShape) -> Self {
        Self {
            records,
            shape,
            malformed: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_malformed(mut self, malformed: Vec<String>) -> Self {
        self.malformed = malformed;
        self
    }

    /// Records plus malformed lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len() + self.malformed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static NO_PROGRESS: NoProgress = NoProgress;

/// The batch migration engine for one run.
pub struct Migrator<'a> {
    destination: &'a dyn Destination,
    options: MigrationOptions,
    progress: &'a dyn ProgressSink,
}

impl<'a> Migrator<'a> {
    #[must_use]
    pub fn new(destination: &'a dyn Destination, options: MigrationOptions) -> Self {
        Self {
            destination,
            options,
            progress: &NO_PROGRESS,
        }
    }

    /// Report progress to `sink` instead of discarding it.
    #[must_use]
    pub fn with_progress(mut self, sink: &'a dyn ProgressSink) -> Self {
        self.progress = sink;
        self
    }

    #[must_use]
    pub const fn options(&self) -> &MigrationOptions {
        &self.options
    }

    /// Print a "still working" line every tenth creation on quiet runs.
    fn still_working(&self, created: usize, what: &str) {
        if !self.options.verbose && created > 0 && created % 10 == 0 {
            self.progress
                .note(&format!("Still working, migrated {created} {what}."));
        }
    }
}
