//! Cross-cutting error types for Sleuth.
//!
//! Errors that any crate may raise live here, together with
//! [`GenerationError`], which is part of the [`GenerateCapability`] contract
//! and therefore shared between the HTTP implementation and the runner.
//! Domain-specific errors (`LakeError`, `RemoteError`, `BatchError`) are
//! defined in their respective crates.
//!
//! [`GenerateCapability`]: crate::capability::GenerateCapability

use thiserror::Error;

/// Errors that can be raised by any Sleuth crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed validation (schema, format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Failure of a single call to the text-generation capability.
///
/// The generator never retries; the runner decides whether a failure is
/// worth another attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The call did not complete within its deadline.
    #[error("generation timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Network or protocol failure before a response was read.
    #[error("generation transport error: {0}")]
    Transport(String),

    /// The capability answered with a non-success status.
    #[error("generation API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The capability asked the caller to back off.
    #[error("generation rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// A response arrived but contained no usable text.
    #[error("generation returned no text")]
    EmptyResponse,

    /// Credentials or endpoint are missing.
    #[error("generation capability not configured: {0}")]
    NotConfigured(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_error_messages_are_human_readable() {
        assert_eq!(
            GenerationError::Timeout { secs: 45 }.to_string(),
            "generation timed out after 45s"
        );
        assert_eq!(
            GenerationError::Api {
                status: 529,
                message: "overloaded".into()
            }
            .to_string(),
            "generation API error (529): overloaded"
        );
    }
}
