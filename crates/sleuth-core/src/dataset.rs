//! Read-only in-memory tabular dataset and its dense delimited encoding.
//!
//! A [`Dataset`] is loaded once by a [`DatasetSource`] and shared as
//! `Arc<Dataset>` for the lifetime of a batch. Nothing in the pipeline
//! mutates it; sampling produces row/column index lists and an encoded
//! payload instead of a modified copy.
//!
//! The encoding is row-major CSV with a header line, RFC 4180 quoting, and
//! nulls written as empty fields. The sampler estimates token cost against
//! exactly this text, and the sandbox receives exactly this text.
//!
//! [`DatasetSource`]: crate::capability::DatasetSource

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::enums::ColumnType;
use crate::errors::CoreError;

/// Unique ratio at or below which a text column is treated as categorical.
pub const CATEGORICAL_UNIQUE_RATIO: f64 = 0.2;

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the cell, if it has one.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Text rendering used by the CSV encoding (nulls render empty).
    #[must_use]
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Bool(v) => Cow::Borrowed(if *v { "true" } else { "false" }),
            Self::Int(v) => Cow::Owned(v.to_string()),
            Self::Float(v) => Cow::Owned(v.to_string()),
            Self::Text(v) => Cow::Borrowed(v.as_str()),
        }
    }
}

/// Column name plus its inferred type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Result of encoding a row/column selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRows {
    /// Header plus one line per selected row.
    pub text: String,
    /// Number of string fields that were cut to the truncation cap.
    pub truncated_fields: usize,
}

/// Immutable tabular dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    id: String,
    columns: Vec<Column>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Build a dataset from typed columns and row-major cells.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if any row width differs from the
    /// column count.
    pub fn new(
        id: impl Into<String>,
        columns: Vec<Column>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, CoreError> {
        let width = columns.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(CoreError::Validation(format!(
                "row {idx} has {} cells, expected {width}",
                row.len()
            )));
        }
        Ok(Self {
            id: id.into(),
            columns,
            rows,
        })
    }

    /// Build a dataset, inferring each column type from its values.
    ///
    /// # Errors
    ///
    /// Same as [`Dataset::new`].
    pub fn with_inferred_types(
        id: impl Into<String>,
        names: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, CoreError> {
        let columns = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let column_type = infer_column_type(rows.iter().filter_map(|r| r.get(idx)));
                Column { name, column_type }
            })
            .collect();
        Self::new(id, columns, rows)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Column name → type tag mapping, as handed to the script generator.
    #[must_use]
    pub fn column_types(&self) -> BTreeMap<String, ColumnType> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.column_type))
            .collect()
    }

    /// Iterate one column's cells.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().filter_map(move |r| r.get(column))
    }

    /// Number of distinct non-null values in a column.
    #[must_use]
    pub fn cardinality(&self, column: usize) -> usize {
        self.column_values(column)
            .filter(|v| !v.is_null())
            .map(CellValue::render)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Encode the selected rows and columns as dense CSV text.
    ///
    /// Text fields longer than `truncate_at` characters are cut to that many
    /// characters. Indices out of range are skipped.
    #[must_use]
    pub fn encode(
        &self,
        rows: &[usize],
        columns: &[usize],
        truncate_at: Option<usize>,
    ) -> EncodedRows {
        let mut text = String::new();
        let mut truncated_fields = 0;

        let header: Vec<&str> = columns
            .iter()
            .filter_map(|&c| self.columns.get(c))
            .map(|c| c.name.as_str())
            .collect();
        push_record(&mut text, header.into_iter().map(Cow::Borrowed));

        for row in rows.iter().filter_map(|&r| self.rows.get(r)) {
            let fields = columns.iter().filter_map(|&c| row.get(c)).map(|cell| {
                let rendered = cell.render();
                match (cell, truncate_at) {
                    (CellValue::Text(s), Some(cap)) if s.chars().count() > cap => {
                        truncated_fields += 1;
                        Cow::Owned(s.chars().take(cap).collect())
                    }
                    _ => rendered,
                }
            });
            push_record(&mut text, fields);
        }

        EncodedRows {
            text,
            truncated_fields,
        }
    }
}

/// Infer a column type tag from its values.
///
/// All-bool → boolean, all-numeric → numeric, otherwise text that is
/// categorical when its unique ratio is at most [`CATEGORICAL_UNIQUE_RATIO`].
pub fn infer_column_type<'a>(values: impl Iterator<Item = &'a CellValue>) -> ColumnType {
    let mut total = 0usize;
    let mut bools = 0usize;
    let mut numbers = 0usize;
    let mut distinct = HashSet::new();

    for value in values {
        total += 1;
        match value {
            CellValue::Null => {}
            CellValue::Bool(_) => bools += 1,
            CellValue::Int(_) | CellValue::Float(_) => numbers += 1,
            CellValue::Text(s) => {
                distinct.insert(s.as_str());
            }
        }
    }

    let non_null = bools + numbers + distinct.len();
    if non_null == 0 {
        return ColumnType::String;
    }
    if bools > 0 && numbers == 0 && distinct.is_empty() {
        return ColumnType::Boolean;
    }
    if numbers > 0 && bools == 0 && distinct.is_empty() {
        return ColumnType::Numeric;
    }

    #[allow(clippy::cast_precision_loss)]
    let ratio = distinct.len() as f64 / total.max(1) as f64;
    if ratio <= CATEGORICAL_UNIQUE_RATIO {
        ColumnType::Categorical
    } else {
        ColumnType::String
    }
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = Cow<'a, str>>) {
    for (idx, field) in fields.enumerate() {
        if idx > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            let _ = write!(out, "\"{}\"", field.replace('"', "\"\""));
        } else {
            out.push_str(&field);
        }
    }
    out.push('\n');
}
