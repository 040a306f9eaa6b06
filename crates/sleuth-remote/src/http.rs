//! Status and error-body handling for Anthropic API responses.
//!
//! Failures come back as `{"type": "error", "error": {"type", "message"}}`.
//! The envelope is decoded so callers see `overloaded_error: Overloaded`
//! instead of raw JSON, and the two back-off conditions (429 rate limits and
//! 529 overload) get their own variants.

use serde::Deserialize;

use crate::error::RemoteError;

/// Status Anthropic uses when the API is temporarily overloaded.
pub const OVERLOADED_STATUS: u16 = 529;

/// Back-off applied when a 429 carries no usable `Retry-After`.
const DEFAULT_RATE_LIMIT_SECS: u64 = 60;

/// Overload is usually short-lived.
const DEFAULT_OVERLOAD_SECS: u64 = 5;

/// Cap on how much of a non-JSON error body is kept in the message.
const MAX_BODY_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    #[serde(default)]
    message: String,
}

/// Pass a successful response through, or turn it into a [`RemoteError`].
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let retry_after = parse_retry_after(&resp);
    let body = resp.text().await.unwrap_or_default();
    Err(error_from_body(status.as_u16(), retry_after, &body))
}

/// Map a failed status and its body to the matching error variant.
fn error_from_body(status: u16, retry_after: Option<u64>, body: &str) -> RemoteError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);

    let error_type = detail.as_ref().map(|d| d.error_type.as_str());
    if status == 429 || error_type == Some("rate_limit_error") {
        return RemoteError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RATE_LIMIT_SECS),
        };
    }
    if status == OVERLOADED_STATUS || error_type == Some("overloaded_error") {
        return RemoteError::Overloaded {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_OVERLOAD_SECS),
        };
    }

    let message = match detail {
        Some(d) if d.message.is_empty() => d.error_type,
        Some(d) => format!("{}: {}", d.error_type, d.message),
        None => describe_raw_body(body),
    };
    RemoteError::Api { status, message }
}

fn describe_raw_body(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return String::from("empty response body");
    }
    body.chars().take(MAX_BODY_CHARS).collect()
}

/// `Retry-After` in whole seconds, when present and numeric.
fn parse_retry_after(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}
