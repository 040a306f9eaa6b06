use std::time::Duration;

use crate::enums::FailureKind;

/// Result of one remote execution, consumed immediately by the runner.
///
/// `success` is only true when the execution tool was invoked and returned
/// output; absence of an error is not enough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub raw_output: Option<String>,
    pub error: Option<String>,
    pub failure: Option<FailureKind>,
    pub duration: Duration,
}

impl ExecutionOutcome {
    #[must_use]
    pub fn succeeded(output: impl Into<String>, duration: Duration) -> Self {
        Self {
            success: true,
            raw_output: Some(output.into()),
            error: None,
            failure: None,
            duration,
        }
    }

    #[must_use]
    pub fn failed(kind: FailureKind, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            success: false,
            raw_output: None,
            error: Some(error.into()),
            failure: Some(kind),
            duration,
        }
    }

    /// Attach whatever partial output the remote captured before failing.
    #[must_use]
    pub fn with_raw_output(mut self, output: impl Into<String>) -> Self {
        self.raw_output = Some(output.into());
        self
    }
}
