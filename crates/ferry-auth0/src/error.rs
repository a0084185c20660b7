//! Source-side error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when setting up or reading the source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP client construction error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token cannot be sent as a header value.
    #[error("invalid authorization header: {0}")]
    InvalidHeader(String),

    /// An export file could not be opened or read.
    #[error("cannot read export file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
