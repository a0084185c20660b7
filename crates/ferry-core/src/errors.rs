//! Cross-cutting error types for ferry.
//!
//! Provider crates keep their own transport errors (`SourceError`,
//! `DescopeError`). Anything that crosses the [`crate::ports::Destination`]
//! seam is converted to [`DestinationError`] so the engine can classify it
//! without knowing which provider produced it.

use std::fmt;

use thiserror::Error;

/// Provider error code Descope returns when a request was rate limited.
pub const RATE_LIMIT_CODE: &str = "E130429";

/// Provider error code Descope returns when a permission name is taken.
pub const DUPLICATE_PERMISSION_CODE: &str = "E024104";

/// Errors raised while building canonical records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The record is missing data required to address it at the destination.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// An error reported by (or while talking to) the destination provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationError {
    /// HTTP status, when the failure came back as a response.
    pub status: Option<u16>,
    /// Provider error code (e.g. `E130429`).
    pub code: Option<String>,
    /// Human-readable reason, used verbatim in failure lists.
    pub message: String,
}

impl DestinationError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether the destination asked us to slow down.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.status == Some(429)
            || self.code.as_deref() == Some(RATE_LIMIT_CODE)
            || self.message.contains(RATE_LIMIT_CODE)
            || self.message.to_lowercase().contains("rate limit")
    }

    /// Whether the object being created already exists.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        self.code.as_deref() == Some(DUPLICATE_PERMISSION_CODE)
            || self.status == Some(409)
            || self.message.to_lowercase().contains("already exists")
    }
}

impl fmt::Display for DestinationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, self.status) {
            (Some(code), _) => write!(f, "{code}: {}", self.message),
            (None, Some(status)) => write!(f, "HTTP {status}: {}", self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for DestinationError {}
