//! Retry and backoff tuning.

use serde::{Deserialize, Serialize};

const fn default_max_retries() -> u32 {
    4
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_backoff_base() -> u64 {
    5
}

const fn default_batch_max_retries() -> u32 {
    3
}

const fn default_batch_backoff_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Attempts per source HTTP call on 429 or read timeout.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-call network timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Source backoff waits `backoff_base ^ attempt` seconds.
    #[serde(default = "default_backoff_base")]
    pub backoff_base: u64,

    /// Resubmissions of a rate-limited batch after the first attempt.
    #[serde(default = "default_batch_max_retries")]
    pub batch_max_retries: u32,

    /// Batch backoff waits `batch_backoff_secs * attempt` seconds.
    #[serde(default = "default_batch_backoff_secs")]
    pub batch_backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            backoff_base: default_backoff_base(),
            batch_max_retries: default_batch_max_retries(),
            batch_backoff_secs: default_batch_backoff_secs(),
        }
    }
}
