use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{FixCategory, HypothesisCategory, Severity};

use super::{Hypothesis, Investigation};

/// An upstream data-quality issue, optionally eligible for code investigation.
///
/// Only `investigation` is written by this crate family; every other field
/// passes through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    #[serde(rename = "type")]
    pub issue_type: String,
    #[serde(default)]
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub affected_columns: Vec<String>,
    #[serde(default)]
    pub suggested_action: String,
    #[serde(default)]
    pub category: FixCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub thresholds: BTreeMap<String, f64>,
    /// Marks the issue for generated-code investigation.
    #[serde(default)]
    pub code_investigation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investigation: Option<Investigation>,
}

impl Issue {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        issue_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            issue_type: issue_type.into(),
            severity: Severity::default(),
            description: description.into(),
            affected_columns: Vec::new(),
            suggested_action: String::new(),
            category: FixCategory::default(),
            affected_rows: None,
            temporal_pattern: None,
            thresholds: BTreeMap::new(),
            code_investigation: false,
            investigation: None,
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
    pub const fn investigate(mut self) -> Self {
        self.code_investigation = true;
        self
    }

    /// The hypothesis this issue asks the pipeline to test.
    #[must_use]
    pub fn hypothesis(&self) -> Hypothesis {
        Hypothesis {
            id: self.id.clone(),
            category: HypothesisCategory::from_label(&self.issue_type),
            description: self.description.clone(),
            affected_columns: self.affected_columns.clone(),
            thresholds: self.thresholds.clone(),
        }
    }
}
