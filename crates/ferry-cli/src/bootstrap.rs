use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Context;
use ferry_auth0::Auth0Client;
use ferry_config::FerryConfig;
use ferry_descope::DescopeClient;
use ferry_engine::{BatchRetryPolicy, MigrationOptions};

use crate::cli::Cli;

/// Load layered configuration, reading `.env` from the working directory first.
pub fn load_config() -> anyhow::Result<FerryConfig> {
    FerryConfig::load_with_dotenv().context("failed to load ferry configuration")
}

/// Build the Descope client. A run cannot start without one.
pub fn descope_client(config: &FerryConfig) -> anyhow::Result<DescopeClient> {
    DescopeClient::new(&config.descope)
        .context("failed to initialize Descope management client")
}

/// Build the Auth0 client, or `None` when no Auth0 credentials are configured.
pub fn auth0_client(config: &FerryConfig) -> anyhow::Result<Option<Auth0Client>> {
    if !config.auth0.is_configured() {
        tracing::warn!("Auth0 credentials are not configured; API phases will be skipped");
        return Ok(None);
    }
    Auth0Client::new(&config.auth0, &config.retry)
        .map(Some)
        .context("failed to initialize Auth0 management client")
}

pub fn migration_options(cli: &Cli, config: &FerryConfig) -> anyhow::Result<MigrationOptions> {
    let batch_size = match cli.batch_size {
        Some(size) => size,
        None => NonZeroUsize::new(config.general.batch_size)
            .context("general.batch_size must be a positive integer")?,
    };
    Ok(MigrationOptions {
        dry_run: cli.dry_run,
        verbose: cli.verbose,
        batch_size,
        batch_retry: BatchRetryPolicy::from_config(&config.retry),
    })
}

pub fn log_dir(cli: &Cli, config: &FerryConfig) -> PathBuf {
    cli.log_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.general.log_dir))
}
