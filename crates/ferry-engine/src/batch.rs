//! Batch chunking and rate-limit-aware resubmission.
//!
//! A batch is submitted as one call. A rate-limited submission is resubmitted
//! unchanged after `backoff * attempt`, up to `max_retries` times. Any other
//! error, or running out of retries, fails the whole batch; the caller marks
//! every record in it failed and moves on.

use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Duration;

use ferry_config::RetryConfig;
use ferry_core::DestinationError;

/// Resubmission budget for rate-limited batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRetryPolicy {
    /// Resubmissions after the first attempt.
    pub max_retries: u32,
    /// Linear backoff unit: attempt `n` waits `backoff * n`.
    pub backoff: Duration,
}

impl Default for BatchRetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl BatchRetryPolicy {
    #[must_use]
    pub const fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.batch_max_retries,
            backoff: Duration::from_secs(config.batch_backoff_secs),
        }
    }

    /// Wait before resubmission `attempt` (1-based).
    #[must_use]
    pub const fn wait(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

/// Number of batches `len` records split into.
#[must_use]
pub const fn batch_count(len: usize, batch_size: NonZeroUsize) -> usize {
    len.div_ceil(batch_size.get())
}

/// Submit a batch, resubmitting while the destination reports rate limiting.
///
/// # Errors
///
/// Returns the last [`DestinationError`] once the batch has failed for good.
pub async fn submit_with_retry<F, Fut>(policy: &BatchRetryPolicy, mut submit: F) -> Result<(), DestinationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), DestinationError>>,
{
    let mut attempt = 0;
    loop {
        match submit().await {
            Ok(()) => return Ok(()),
            Err(error) if error.is_rate_limited() && attempt < policy.max_retries => {
                attempt += 1;
                let wait = policy.wait(attempt);
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    wait_secs = wait.as_secs(),
                    "rate limit hit; resubmitting batch after backoff"
                );
                tokio::time::sleep(wait).await;
            }
            Err(error) => {
                if error.is_rate_limited() {
                    tracing::error!(%error, "max retries reached; failing batch");
                } else {
                    tracing::error!(%error, "batch submission failed");
                }
                return Err(error);
            }
        }
    }
}
