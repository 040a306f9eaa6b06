use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Every decision the sampler made for one investigation.
///
/// Created once and never mutated. `row_count == 0` means the dataset could
/// not be investigated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SampleDescriptor {
    /// Rows included in the payload.
    pub row_count: usize,
    /// Token estimate of the final encoded payload.
    pub estimated_tokens: usize,
    /// Columns removed to fit the budget, in drop order.
    #[serde(default)]
    pub dropped_columns: Vec<String>,
    /// String fields cut to `truncation_cap` characters.
    #[serde(default)]
    pub truncated_fields: usize,
    /// Field cap applied, if truncation was needed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation_cap: Option<usize>,
    pub source_rows: usize,
    pub source_columns: usize,
}

impl SampleDescriptor {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}
