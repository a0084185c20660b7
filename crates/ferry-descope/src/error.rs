//! Destination client setup errors.
//!
//! Errors from individual management calls are reported as
//! [`ferry_core::DestinationError`] instead; only construction can fail here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescopeError {
    /// Project id or management key missing.
    #[error("Descope is not configured: set DESCOPE_PROJECT_ID and DESCOPE_MANAGEMENT_KEY")]
    NotConfigured,

    /// The credentials cannot be sent as a header value.
    #[error("invalid authorization header: {0}")]
    InvalidHeader(String),

    /// HTTP client construction error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
