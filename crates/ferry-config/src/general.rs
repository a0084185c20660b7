//! General run configuration.

use serde::{Deserialize, Serialize};

/// Default number of users per bulk create call.
const fn default_batch_size() -> usize {
    50
}

fn default_log_dir() -> String {
    "logs".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Users per bulk create call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Directory receiving one log file per run.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            log_dir: default_log_dir(),
        }
    }
}
