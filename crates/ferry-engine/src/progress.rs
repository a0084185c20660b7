//! Progress events emitted while a phase runs.
//!
//! The engine never prints; it reports through a [`ProgressSink`] and the
//! binary decides how to render it (bars on a terminal, plain lines in a log).

use std::fmt;

/// One pass of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Passwords,
    Users,
    Roles,
    Organizations,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passwords => "users with passwords",
            Self::Users => "users",
            Self::Roles => "roles",
            Self::Organizations => "organizations",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver for engine progress. Every method defaults to doing nothing.
pub trait ProgressSink: Send + Sync {
    /// A phase is about to process `total` items.
    fn phase_started(&self, _phase: Phase, _total: usize, _dry_run: bool) {}

    /// Verbose runs only: batch `index` (1-based) covers items `first..=last`.
    fn batch_started(&self, _phase: Phase, _index: usize, _first: usize, _last: usize) {}

    /// `processed` of `total` items handled, `succeeded` of them successfully.
    fn progress(&self, _phase: Phase, _processed: usize, _total: usize, _succeeded: usize) {}

    /// A free-form line for the operator.
    fn note(&self, _line: &str) {}

    fn phase_finished(&self, _phase: Phase) {}
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Whether a progress line is due after moving from `before` to `after`
/// processed records: every time a multiple of 100 is crossed, and always at
/// the end of the phase.
#[must_use]
pub const fn report_due(before: usize, after: usize, total: usize) -> bool {
    after >= total || before / 100 != after / 100
}
