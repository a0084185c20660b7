//! # ferry-config
//!
//! Layered configuration loading for ferry using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Legacy raw environment variables (`AUTH0_TOKEN`, `AUTH0_TENANT_ID`,
//!    `AUTH0_DOMAIN`, `DESCOPE_PROJECT_ID`, `DESCOPE_MANAGEMENT_KEY`,
//!    `DESCOPE_BASE_URL`)
//! 2. Environment variables (`FERRY_*` prefix, `__` as separator)
//! 3. Project-level `ferry.toml`
//! 4. User-level `~/.config/ferry/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `FERRY_GENERAL__BATCH_SIZE` -> `general.batch_size`,
//! `FERRY_DESCOPE__PROJECT_ID` -> `descope.project_id`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use ferry_config::FerryConfig;
//!
//! let config = FerryConfig::load_with_dotenv().expect("config");
//! if config.descope.is_configured() {
//!     println!("Descope project: {}", config.descope.project_id);
//! }
//! ```

mod auth0;
mod descope;
mod error;
mod general;
mod retry;

pub use auth0::Auth0Config;
pub use descope::DescopeConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use retry::RetryConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Unprefixed variable names kept working for existing `.env` files.
const LEGACY_ENV_KEYS: [&str; 6] = [
    "AUTH0_TOKEN",
    "AUTH0_TENANT_ID",
    "AUTH0_DOMAIN",
    "DESCOPE_PROJECT_ID",
    "DESCOPE_MANAGEMENT_KEY",
    "DESCOPE_BASE_URL",
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FerryConfig {
    #[serde(default)]
    pub auth0: Auth0Config,
    #[serde(default)]
    pub descope: DescopeConfig,
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl FerryConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support from the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source cannot be parsed or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from("ferry.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Prefixed environment variables
        figment = figment.merge(Env::prefixed("FERRY_").split("__"));

        // Layer 4: Legacy unprefixed credentials (highest priority)
        figment.merge(
            Env::raw()
                .only(&LEGACY_ENV_KEYS)
                .map(|key| legacy_key_path(key.as_str()).into()),
        )
    }

    /// Reject values no run could work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero batch or page size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.batch_size".into(),
                reason: "must be a positive integer".into(),
            });
        }
        if self.auth0.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "auth0.page_size".into(),
                reason: "must be a positive integer".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ferry").join("config.toml"))
    }
}

fn legacy_key_path(key: &str) -> &'static str {
    match key.to_ascii_uppercase().as_str() {
        "AUTH0_TOKEN" => "auth0.token",
        "AUTH0_TENANT_ID" => "auth0.tenant_id",
        "AUTH0_DOMAIN" => "auth0.domain",
        "DESCOPE_PROJECT_ID" => "descope.project_id",
        "DESCOPE_MANAGEMENT_KEY" => "descope.management_key",
        _ => "descope.base_url",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = FerryConfig::default();
        assert!(!config.auth0.is_configured());
        assert!(!config.descope.is_configured());
        assert_eq!(config.general.batch_size, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn legacy_keys_map_to_sections() {
        assert_eq!(legacy_key_path("AUTH0_TOKEN"), "auth0.token");
        assert_eq!(legacy_key_path("auth0_tenant_id"), "auth0.tenant_id");
        assert_eq!(legacy_key_path("DESCOPE_MANAGEMENT_KEY"), "descope.management_key");
        assert_eq!(legacy_key_path("DESCOPE_BASE_URL"), "descope.base_url");
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = FerryConfig::default();
        config.general.batch_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
