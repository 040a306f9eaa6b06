//! Batch-level error types.

use sleuth_core::entities::Issue;
use thiserror::Error;

/// The only error that leaves the orchestrator.
///
/// Both variants carry the fully enriched issue list: every eligible issue
/// has a failed `investigation` attached, so callers can still render it or
/// hand it to a heuristic fallback.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Every eligible investigation failed.
    #[error("all {failures} investigations failed")]
    AllFailed { issues: Vec<Issue>, failures: usize },

    /// The batch was cancelled or timed out before any investigation succeeded.
    #[error("investigation batch cancelled")]
    Cancelled { issues: Vec<Issue> },
}

impl BatchError {
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::AllFailed { issues, .. } | Self::Cancelled { issues } => issues,
        }
    }

    #[must_use]
    pub fn into_issues(self) -> Vec<Issue> {
        match self {
            Self::AllFailed { issues, .. } | Self::Cancelled { issues } => issues,
        }
    }
}
