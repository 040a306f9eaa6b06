use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::HypothesisCategory;

/// A suspected data-quality problem, produced upstream and read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hypothesis {
    pub id: String,
    pub category: HypothesisCategory,
    pub description: String,
    #[serde(default)]
    pub affected_columns: Vec<String>,
    /// Optional numeric knobs (e.g. `iqr_multiplier`, `max_missing_ratio`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub thresholds: BTreeMap<String, f64>,
}

impl Hypothesis {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        category: HypothesisCategory,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            description: description.into(),
            affected_columns: Vec::new(),
            thresholds: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.affected_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, name: impl Into<String>, value: f64) -> Self {
        self.thresholds.insert(name.into(), value);
        self
    }
}
