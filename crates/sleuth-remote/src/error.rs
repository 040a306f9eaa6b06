//! Remote API error types.

use thiserror::Error;

/// Errors that can occur when talking to the Messages API.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The API returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The API is temporarily overloaded (HTTP 529, `overloaded_error`).
    #[error("API overloaded, retry after {retry_after_secs}s")]
    Overloaded { retry_after_secs: u64 },

    /// Failed to parse an API response.
    #[error("parse error: {0}")]
    Parse(String),

    /// No API key configured.
    #[error("remote client not configured: {0}")]
    NotConfigured(String),
}

impl RemoteError {
    /// Whether the failure was the client-side request deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Whether the server asked the caller to wait and try again.
    #[must_use]
    pub const fn is_backoff(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Overloaded { .. })
    }
}
