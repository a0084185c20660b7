use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

pub mod format;

pub use format::OutputFormat;

/// Command-line parser for the `ferry` binary.
#[derive(Debug, Parser)]
#[command(
    name = "ferry",
    version,
    about = "Migrate users, roles, permissions and organizations from Auth0 to Descope"
)]
pub struct Cli {
    /// Read and normalize everything but make no changes in Descope
    #[arg(long)]
    pub dry_run: bool,

    /// Print per-batch and per-item detail (debug logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Also import users with bcrypt password hashes from this export file
    #[arg(long, value_name = "FILE")]
    pub with_passwords: Option<PathBuf>,

    /// Read users from this export file instead of the Auth0 API
    #[arg(long, value_name = "FILE")]
    pub from_json: Option<PathBuf>,

    /// Skip roles and permissions
    #[arg(long)]
    pub skip_roles: bool,

    /// Skip organizations and tenants
    #[arg(long)]
    pub skip_orgs: bool,

    /// Users per bulk create call (overrides general.batch_size)
    #[arg(long, value_name = "N")]
    pub batch_size: Option<NonZeroUsize>,

    /// Summary format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Directory for the run log file (overrides general.log_dir)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Whether any enabled phase reads from the live Auth0 API.
    #[must_use]
    pub const fn needs_api(&self) -> bool {
        self.from_json.is_none() || !self.skip_roles || !self.skip_orgs
    }
}
