//! Non-generative fallback checks.
//!
//! When a whole batch of generated investigations fails, the caller can
//! still attach plain statistics computed locally: null and blank counts,
//! distinct values, duplicate rows, and IQR outliers for numeric columns.

use std::collections::HashSet;

use serde_json::{Map, Value, json};
use sleuth_core::capability::HeuristicAnalyzer;
use sleuth_core::dataset::{CellValue, Dataset};
use sleuth_core::entities::{Hypothesis, Investigation, Issue};

use crate::orchestrator::is_eligible;

/// Default IQR multiplier when the hypothesis sets none.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Threshold key read from [`Hypothesis::thresholds`].
pub const IQR_MULTIPLIER_KEY: &str = "iqr_multiplier";

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicHeuristics;

impl HeuristicAnalyzer for BasicHeuristics {
    fn analyze(&self, dataset: &Dataset, hypothesis: &Hypothesis) -> Investigation {
        let multiplier = hypothesis
            .thresholds
            .get(IQR_MULTIPLIER_KEY)
            .copied()
            .unwrap_or(DEFAULT_IQR_MULTIPLIER);

        let names: Vec<String> = if hypothesis.affected_columns.is_empty() {
            dataset.columns().iter().map(|c| c.name.clone()).collect()
        } else {
            hypothesis.affected_columns.clone()
        };

        let mut columns = Map::new();
        for name in names {
            let stats = dataset.column_index(&name).map_or_else(
                || json!({ "missing": true }),
                |idx| column_stats(dataset, idx, multiplier),
            );
            columns.insert(name, stats);
        }

        let output = json!({
            "heuristic": true,
            "hypothesisId": hypothesis.id,
            "category": hypothesis.category,
            "rowCount": dataset.row_count(),
            "duplicateRows": duplicate_rows(dataset),
            "columns": columns,
        });
        Investigation::succeeded(String::new(), output)
    }
}

/// Attach heuristic investigations to every eligible issue.
#[must_use]
pub fn apply_heuristics(
    analyzer: &dyn HeuristicAnalyzer,
    dataset: &Dataset,
    issues: Vec<Issue>,
    investigate_all: bool,
) -> Vec<Issue> {
    issues
        .into_iter()
        .map(|mut issue| {
            if is_eligible(&issue, investigate_all) {
                issue.investigation = Some(analyzer.analyze(dataset, &issue.hypothesis()));
            }
            issue
        })
        .collect()
}

fn column_stats(dataset: &Dataset, idx: usize, multiplier: f64) -> Value {
    let mut nulls = 0usize;
    let mut blanks = 0usize;
    let mut numbers = Vec::new();

    for cell in dataset.column_values(idx) {
        match cell {
            CellValue::Null => nulls += 1,
            CellValue::Text(s) if s.trim().is_empty() => blanks += 1,
            other => {
                if let Some(v) = other.as_f64() {
                    numbers.push(v);
                }
            }
        }
    }

    let mut stats = json!({
        "type": dataset.columns()[idx].column_type,
        "nullCount": nulls,
        "blankCount": blanks,
        "distinctCount": dataset.cardinality(idx),
    });

    if dataset.columns()[idx].column_type.is_numeric() {
        if let Some((lower, upper)) = iqr_bounds(&mut numbers, multiplier) {
            let outliers = numbers.iter().filter(|&&v| v < lower || v > upper).count();
            stats["outlierCount"] = json!(outliers);
            stats["lowerBound"] = json!(lower);
            stats["upperBound"] = json!(upper);
        }
    }
    stats
}

/// Tukey fences. Sorts `values` in place.
fn iqr_bounds(values: &mut [f64], multiplier: f64) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let q1 = quantile(values, 0.25);
    let q3 = quantile(values, 0.75);
    let iqr = q3 - q1;
    Some((q1 - multiplier * iqr, q3 + multiplier * iqr))
}

/// Linear-interpolated quantile of sorted values.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Rows identical to an earlier row.
fn duplicate_rows(dataset: &Dataset) -> usize {
    let mut seen = HashSet::with_capacity(dataset.row_count());
    dataset
        .rows()
        .iter()
        .filter(|row| {
            let key: Vec<String> = row.iter().map(|c| c.render().into_owned()).collect();
            !seen.insert(key)
        })
        .count()
}
