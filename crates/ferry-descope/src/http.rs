//! Shared response handling for management calls.
//!
//! Descope reports failures as a JSON body carrying `errorCode`,
//! `errorDescription` and `errorMessage`. Every non-success response is turned
//! into a [`DestinationError`] here so the engine can classify it (rate limit,
//! already exists) without looking at provider payloads.

use ferry_core::DestinationError;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ErrorBody {
    error_code: String,
    error_description: String,
    error_message: String,
}

/// Return the response unchanged on success, or the decoded provider error.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, DestinationError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(error_from_body(status.as_u16(), &body))
}

/// Build a [`DestinationError`] from a failed response's status and body.
#[must_use]
pub fn error_from_body(status: u16, body: &str) -> DestinationError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    let message = [parsed.error_message, parsed.error_description]
        .into_iter()
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("request failed with status {status}")
            } else {
                body.trim().to_string()
            }
        });

    let error = DestinationError::new(message).with_status(status);
    if parsed.error_code.is_empty() {
        error
    } else {
        error.with_code(parsed.error_code)
    }
}

/// A call that never produced a response.
pub fn transport_error(error: &reqwest::Error) -> DestinationError {
    if error.is_timeout() {
        DestinationError::new(format!("request timed out: {error}"))
    } else {
        DestinationError::new(format!("request failed: {error}"))
    }
}
