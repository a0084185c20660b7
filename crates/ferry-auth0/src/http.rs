//! Retrying transport for source API calls.
//!
//! Wraps one outbound request with bounded retries on `429 Too Many Requests`
//! and on timeouts. Both conditions share a single attempt counter and wait
//! `backoff_base ^ attempt` seconds between attempts. Any other transport
//! failure aborts immediately. Exhausting the budget yields `None`, which
//! callers treat as a failed fetch.

use std::future::Future;
use std::time::Duration;

use ferry_config::RetryConfig;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::error::SourceError;

/// Retry budget and backoff shape for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_retries: u32,
    /// Per-attempt network timeout.
    pub timeout: Duration,
    /// Wait before attempt `n + 1` is `backoff_unit * backoff_base ^ n`.
    pub backoff_base: u64,
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            timeout: Duration::from_secs(config.timeout_secs),
            backoff_base: config.backoff_base,
            backoff_unit: Duration::from_secs(1),
        }
    }

    /// Wait after the `attempt`-th failed attempt (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = self.backoff_base.saturating_pow(attempt);
        self.backoff_unit
            .saturating_mul(u32::try_from(factor).unwrap_or(u32::MAX))
    }
}

/// Why a single attempt produced no response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendFailure {
    /// The call timed out; retried like a 429.
    Timeout(String),
    /// Any other transport error; not retried.
    Other(String),
}

impl From<reqwest::Error> for SendFailure {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else {
            Self::Other(error.to_string())
        }
    }
}

/// Drive `send` until it yields a non-429 response or the budget runs out.
pub async fn send_with_retry<F, Fut>(policy: &RetryPolicy, mut send: F) -> Option<reqwest::Response>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, SendFailure>>,
{
    let max_attempts = policy.max_retries.max(1);
    let mut attempt = 0;
    loop {
        let reason = match send().await {
            Ok(resp) if resp.status() != StatusCode::TOO_MANY_REQUESTS => return Some(resp),
            Ok(_) => "rate limit reached".to_string(),
            Err(SendFailure::Timeout(reason)) => format!("read timed out: {reason}"),
            Err(SendFailure::Other(reason)) => {
                tracing::error!(%reason, "request failed; not retrying");
                return None;
            }
        };

        attempt += 1;
        if attempt >= max_attempts {
            tracing::error!(attempt, %reason, "max retries reached; giving up");
            return None;
        }

        let wait = policy.backoff(attempt);
        tracing::warn!(
            attempt,
            max_attempts,
            wait_secs = wait.as_secs(),
            %reason,
            "retrying source request after backoff"
        );
        tokio::time::sleep(wait).await;
    }
}

/// HTTP client that applies a [`RetryPolicy`] to every call.
pub struct RetryingTransport {
    http: reqwest::Client,
    policy: RetryPolicy,
}

impl RetryingTransport {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying client fails to build.
    pub fn new(policy: RetryPolicy) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ferry/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, policy })
    }

    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send one request with retries. `None` means the call failed for good.
    pub async fn call(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&Value>,
    ) -> Option<reqwest::Response> {
        send_with_retry(&self.policy, || {
            let mut request = self
                .http
                .request(method.clone(), url)
                .headers(headers.clone())
                .timeout(self.policy.timeout);
            if let Some(body) = body {
                request = request.json(body);
            }
            async move { request.send().await.map_err(SendFailure::from) }
        })
        .await
    }
}
