use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{FailureKind, InvestigationStage};

use super::SampleDescriptor;

/// Record of one generate → execute → parse attempt for a hypothesis.
///
/// This is the `investigation` attachment handed back on each issue.
/// `success == false` with a populated `error` is a normal terminal state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Investigation {
    /// Script that was executed (empty if generation never succeeded).
    pub code: String,
    pub success: bool,
    /// Structured record emitted by the script.
    pub output: Option<serde_json::Value>,
    pub error: Option<String>,
    pub duration_ms: u64,
    /// Last stage reached before terminating.
    pub stage: InvestigationStage,
    #[serde(default)]
    pub generation_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Console text kept when parsing failed, for debugging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<SampleDescriptor>,
}

impl Investigation {
    /// A failed investigation that stopped at `stage`.
    #[must_use]
    pub fn failed(stage: InvestigationStage, error: impl Into<String>) -> Self {
        Self {
            code: String::new(),
            success: false,
            output: None,
            error: Some(error.into()),
            duration_ms: 0,
            stage,
            generation_attempts: 0,
            fingerprint: None,
            failure: None,
            raw_output: None,
            sample: None,
        }
    }

    /// A successful investigation carrying the parsed record.
    #[must_use]
    pub fn succeeded(code: impl Into<String>, output: serde_json::Value) -> Self {
        Self {
            code: code.into(),
            success: true,
            output: Some(output),
            error: None,
            duration_ms: 0,
            stage: InvestigationStage::Succeeded,
            generation_attempts: 0,
            fingerprint: None,
            failure: None,
            raw_output: None,
            sample: None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn with_sample(mut self, sample: SampleDescriptor) -> Self {
        self.sample = Some(sample);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_investigation_serializes_camel_case() {
        let inv = Investigation::failed(InvestigationStage::Executing, "sandbox timed out")
            .with_duration(Duration::from_millis(1500));
        let json = serde_json::to_value(&inv).unwrap();
        assert_eq!(json["durationMs"], 1500);
        assert_eq!(json["stage"], "executing");
        assert_eq!(json["success"], false);
        assert!(json.get("rawOutput").is_none());
    }
}
