use std::io::IsTerminal;
use std::sync::Mutex;

use ferry_engine::{Phase, ProgressSink};
use indicatif::{ProgressBar, ProgressStyle};

/// Renders engine progress on stdout.
///
/// On a terminal each phase gets a bar; otherwise progress is printed as
/// plain lines so redirected output stays readable.
pub struct TerminalProgress {
    interactive: bool,
    bar: Mutex<Option<ProgressBar>>,
}

fn as_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

impl TerminalProgress {
    #[must_use]
    pub fn new() -> Self {
        Self {
            interactive: std::io::stdout().is_terminal(),
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) -> bool {
        match self.bar.lock() {
            Ok(guard) => guard.as_ref().map(f).is_some(),
            Err(_) => false,
        }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalProgress {
    fn phase_started(&self, phase: Phase, total: usize, dry_run: bool) {
        if dry_run || !self.interactive {
            return;
        }
        let bar = ProgressBar::new(as_u64(total));
        bar.set_style(bar_style());
        bar.set_message(format!("migrating {phase}"));
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn batch_started(&self, phase: Phase, index: usize, first: usize, last: usize) {
        self.note(&format!("Starting batch {index}: {phase} {first}-{last}"));
    }

    fn progress(&self, phase: Phase, processed: usize, total: usize, succeeded: usize) {
        let drawn = self.with_bar(|bar| {
            bar.set_position(as_u64(processed));
            bar.set_message(format!("{succeeded} {phase} migrated"));
        });
        if !drawn {
            println!("Processed {processed}/{total} {phase}, {succeeded} migrated");
        }
    }

    fn note(&self, line: &str) {
        if !self.with_bar(|bar| bar.println(line)) {
            println!("{line}");
        }
    }

    fn phase_finished(&self, _phase: Phase) {
        if let Ok(mut slot) = self.bar.lock()
            && let Some(bar) = slot.take()
        {
            bar.finish_and_clear();
        }
    }
}
