//! Category enums, column types, and the investigation state machine.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! [`InvestigationStage`] provides `allowed_next_states()` so the runner can
//! refuse backward transitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// HypothesisCategory
// ---------------------------------------------------------------------------

/// Kind of data-quality problem a hypothesis suspects.
///
/// Unknown upstream labels deserialize to [`HypothesisCategory::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisCategory {
    MissingValues,
    Duplicates,
    Outliers,
    InconsistentCategories,
    Format,
    Temporal,
    #[serde(other)]
    Other,
}

impl HypothesisCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingValues => "missing_values",
            Self::Duplicates => "duplicates",
            Self::Outliers => "outliers",
            Self::InconsistentCategories => "inconsistent_categories",
            Self::Format => "format",
            Self::Temporal => "temporal",
            Self::Other => "other",
        }
    }

    /// Map a free-form issue type label onto a category.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "missing_values" | "missing" | "nulls" => Self::MissingValues,
            "duplicates" | "duplicate_rows" => Self::Duplicates,
            "outliers" | "outlier" => Self::Outliers,
            "inconsistent_categories" | "category_drift" => Self::InconsistentCategories,
            "format" | "invalid_format" => Self::Format,
            "temporal" | "temporal_pattern" => Self::Temporal,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for HypothesisCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity attached to an upstream issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FixCategory
// ---------------------------------------------------------------------------

/// How an issue is expected to be fixed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FixCategory {
    #[default]
    QuickFixes,
    SmartFixes,
}

// ---------------------------------------------------------------------------
// ColumnType
// ---------------------------------------------------------------------------

/// Inferred type tag of a dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Numeric,
    String,
    Categorical,
    Date,
    Boolean,
}

impl ColumnType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::String => "string",
            Self::Categorical => "categorical",
            Self::Date => "date",
            Self::Boolean => "boolean",
        }
    }

    /// Numeric and boolean columns are never dropped by the sampler.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Numeric | Self::Boolean)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InvestigationStage
// ---------------------------------------------------------------------------

/// Stage of a single investigation.
///
/// ```text
/// sampling → generating → executing → parsing → succeeded
///          ↘            ↘           ↘         ↘ failed
/// ```
///
/// Every non-terminal stage may fail; there is no backward transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationStage {
    Sampling,
    Generating,
    Executing,
    Parsing,
    Succeeded,
    Failed,
}

impl InvestigationStage {
    /// Valid next stages from the current stage.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Sampling => &[Self::Generating, Self::Failed],
            Self::Generating => &[Self::Executing, Self::Failed],
            Self::Executing => &[Self::Parsing, Self::Failed],
            Self::Parsing => &[Self::Succeeded, Self::Failed],
            Self::Succeeded | Self::Failed => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sampling => "sampling",
            Self::Generating => "generating",
            Self::Executing => "executing",
            Self::Parsing => "parsing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for InvestigationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FailureKind
// ---------------------------------------------------------------------------

/// Classification of a failed remote execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The wall-clock ceiling was hit (client- or server-side).
    Timeout,
    /// The remote answered without ever invoking the execution tool.
    ToolNotInvoked,
    /// The tool ran and reported an error or non-zero exit.
    RemoteError,
    /// The request never produced a usable response.
    Transport,
    /// The remote stopped at its output-token cap before finishing the run.
    TokenLimit,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::ToolNotInvoked => "tool_not_invoked",
            Self::RemoteError => "remote_error",
            Self::Transport => "transport",
            Self::TokenLimit => "token_limit",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProgressKind
// ---------------------------------------------------------------------------

/// Observation points reported to a progress sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    SampleComputed,
    ScriptGenerated,
    ExecutionStarted,
    InvestigationComplete,
}

impl ProgressKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SampleComputed => "sample_computed",
            Self::ScriptGenerated => "script_generated",
            Self::ExecutionStarted => "execution_started",
            Self::InvestigationComplete => "investigation_complete",
        }
    }
}

impl fmt::Display for ProgressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("missing_values", HypothesisCategory::MissingValues)]
    #[case(" Nulls ", HypothesisCategory::MissingValues)]
    #[case("duplicate_rows", HypothesisCategory::Duplicates)]
    #[case("outlier", HypothesisCategory::Outliers)]
    #[case("category_drift", HypothesisCategory::InconsistentCategories)]
    #[case("invalid_format", HypothesisCategory::Format)]
    #[case("temporal_pattern", HypothesisCategory::Temporal)]
    #[case("correlation", HypothesisCategory::Other)]
    fn labels_map_to_categories(#[case] label: &str, #[case] expected: HypothesisCategory) {
        assert_eq!(HypothesisCategory::from_label(label), expected);
    }

    #[test]
    fn stage_machine_is_strictly_forward() {
        use InvestigationStage::*;
        let order = [Sampling, Generating, Executing, Parsing, Succeeded];
        for pair in order.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]));
            assert!(!pair[1].can_transition_to(pair[0]));
        }
        for stage in [Sampling, Generating, Executing, Parsing] {
            assert!(stage.can_transition_to(Failed));
        }
        assert!(Succeeded.allowed_next_states().is_empty());
        assert!(Failed.allowed_next_states().is_empty());
    }

    #[test]
    fn unknown_category_maps_to_other() {
        let cat: HypothesisCategory = serde_json::from_str("\"schema_drift\"").unwrap();
        assert_eq!(cat, HypothesisCategory::Other);
        assert_eq!(
            HypothesisCategory::from_label("Missing"),
            HypothesisCategory::MissingValues
        );
    }

    #[test]
    fn enums_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&FailureKind::ToolNotInvoked).unwrap(),
            "\"tool_not_invoked\""
        );
        assert_eq!(FailureKind::TokenLimit.as_str(), "token_limit");
        assert_eq!(
            serde_json::to_string(&FailureKind::TokenLimit).unwrap(),
            "\"token_limit\""
        );
        assert_eq!(
            serde_json::to_string(&FixCategory::SmartFixes).unwrap(),
            "\"smart_fixes\""
        );
        assert_eq!(InvestigationStage::Executing.to_string(), "executing");
    }
}
