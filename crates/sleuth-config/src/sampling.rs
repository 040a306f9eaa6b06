//! Sampling budget configuration.

use serde::{Deserialize, Serialize};

const fn default_token_budget() -> usize {
    120_000
}

const fn default_target_rows() -> usize {
    10_000
}

const fn default_estimate_rows() -> usize {
    50
}

const fn default_min_rows() -> usize {
    25
}

/// Dense delimited text averages about two characters per token.
const fn default_chars_per_token() -> f64 {
    2.0
}

const fn default_field_char_cap() -> usize {
    200
}

const fn default_seed() -> u64 {
    42
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SamplingConfig {
    /// Estimated token ceiling for one investigation's data payload.
    #[serde(default = "default_token_budget")]
    pub token_budget: usize,

    /// Row cap requested by the caller before budget limits apply.
    #[serde(default = "default_target_rows")]
    pub target_rows: usize,

    /// Rows serialized to estimate tokens per row.
    #[serde(default = "default_estimate_rows")]
    pub estimate_rows: usize,

    /// Floor on selected rows whenever the dataset has that many.
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,

    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: f64,

    /// Long string fields are cut to this many characters when over budget.
    #[serde(default = "default_field_char_cap")]
    pub field_char_cap: usize,

    /// Seed for picking the middle section of the sample.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            token_budget: default_token_budget(),
            target_rows: default_target_rows(),
            estimate_rows: default_estimate_rows(),
            min_rows: default_min_rows(),
            chars_per_token: default_chars_per_token(),
            field_char_cap: default_field_char_cap(),
            seed: default_seed(),
        }
    }
}
