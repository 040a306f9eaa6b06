//! # sleuth-lake
//!
//! Local dataset loading through an in-memory `DuckDB` connection.
//!
//! Datasets are delimited text files read with `read_csv_auto`, which sniffs
//! the delimiter, header, and column types. `DuckDB`'s inferred types map onto
//! Sleuth's column tags:
//!
//! | `DuckDB` type | Column type | Cell value |
//! |---|---|---|
//! | `BOOLEAN` | boolean | `Bool` |
//! | integer types | numeric | `Int` |
//! | `FLOAT`, `DOUBLE`, `DECIMAL` | numeric | `Float` |
//! | `DATE`, `TIME`, `TIMESTAMP*` | date | `Text` (ISO rendering) |
//! | anything else | categorical or string by unique ratio | `Text` |

pub mod error;

pub use error::LakeError;

use std::path::{Path, PathBuf};

use duckdb::Connection;
use duckdb::types::Value;
use sleuth_core::capability::DatasetSource;
use sleuth_core::dataset::{CellValue, Column, Dataset, infer_column_type};
use sleuth_core::enums::ColumnType;

/// Extensions `read_csv_auto` is asked to read.
const DELIMITED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// How a source column is selected and tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Boolean,
    Integer,
    Float,
    Temporal,
    Text,
}

impl ColumnKind {
    fn from_duckdb(type_name: &str) -> Self {
        let upper = type_name.trim().to_ascii_uppercase();
        match upper.as_str() {
            "BOOLEAN" => Self::Boolean,
            "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT" | "HUGEINT" | "UTINYINT"
            | "USMALLINT" | "UINTEGER" | "UBIGINT" => Self::Integer,
            "FLOAT" | "DOUBLE" | "REAL" => Self::Float,
            t if t.starts_with("DECIMAL") => Self::Float,
            t if t == "DATE" || t.starts_with("TIME") => Self::Temporal,
            _ => Self::Text,
        }
    }

    /// Select expression normalizing the column to a small set of value types.
    fn select_expr(self, quoted: &str) -> String {
        match self {
            Self::Boolean => quoted.to_string(),
            Self::Integer => format!("TRY_CAST({quoted} AS BIGINT)"),
            Self::Float => format!("CAST({quoted} AS DOUBLE)"),
            Self::Temporal | Self::Text => format!("CAST({quoted} AS VARCHAR)"),
        }
    }
}

/// Loads datasets from a data directory.
///
/// Identifiers resolve to `<root>/<id>.csv`; an identifier that is itself an
/// existing file path is read directly.
pub struct DatasetStore {
    conn: Connection,
    root: PathBuf,
}

impl DatasetStore {
    /// Open a store over `root` backed by an in-memory `DuckDB`.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::DuckDb`] if the connection cannot be opened.
    pub fn open_in_memory(root: impl Into<PathBuf>) -> Result<Self, LakeError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn,
            root: root.into(),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an identifier to a readable file.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::DatasetNotFound`] when nothing matches and
    /// [`LakeError::Unsupported`] for an existing file with an unknown
    /// extension.
    pub fn resolve(&self, id: &str) -> Result<PathBuf, LakeError> {
        let direct = PathBuf::from(id);
        let candidates = [
            direct.clone(),
            self.root.join(id),
            self.root.join(format!("{id}.csv")),
        ];

        let Some(path) = candidates.into_iter().find(|p| p.is_file()) else {
            return Err(LakeError::DatasetNotFound {
                id: id.to_string(),
                root: self.root.display().to_string(),
            });
        };

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !DELIMITED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(LakeError::Unsupported(path.display().to_string()));
        }
        Ok(path)
    }

    /// Load a delimited file into an in-memory [`Dataset`].
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::DuckDb`] if the file cannot be sniffed or read.
    pub fn load_path(&self, path: &Path, id: &str) -> Result<Dataset, LakeError> {
        let source = format!(
            "read_csv_auto('{}')",
            path.to_string_lossy().replace('\'', "''")
        );

        let mut describe = self.conn.prepare(&format!("DESCRIBE SELECT * FROM {source}"))?;
        let schema: Vec<(String, ColumnKind)> = describe
            .query_map([], |row| {
                let name: String = row.get(0)?;
                let type_name: String = row.get(1)?;
                Ok((name, ColumnKind::from_duckdb(&type_name)))
            })?
            .collect::<Result<_, _>>()?;

        if schema.is_empty() {
            return Err(LakeError::Unsupported(format!(
                "{} has no columns",
                path.display()
            )));
        }

        let select = schema
            .iter()
            .map(|(name, kind)| kind.select_expr(&quote_ident(name)))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = self.conn.prepare(&format!("SELECT {select} FROM {source}"))?;
        let width = schema.len();

        let rows: Vec<Vec<CellValue>> = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i).map(cell_from_value))
                    .collect()
            })?
            .collect::<Result<_, _>>()?;

        let columns = schema
            .into_iter()
            .enumerate()
            .map(|(idx, (name, kind))| {
                let column_type = match kind {
                    ColumnKind::Boolean => ColumnType::Boolean,
                    ColumnKind::Integer | ColumnKind::Float => ColumnType::Numeric,
                    ColumnKind::Temporal => ColumnType::Date,
                    ColumnKind::Text => infer_column_type(rows.iter().map(|r| &r[idx])),
                };
                Column::new(name, column_type)
            })
            .collect();

        tracing::debug!(
            dataset = id,
            path = %path.display(),
            rows = rows.len(),
            columns = width,
            "dataset loaded"
        );

        Ok(Dataset::new(id, columns, rows)?)
    }
}

impl DatasetSource for DatasetStore {
    type Error = LakeError;

    fn load_dataset(&self, id: &str) -> Result<Dataset, LakeError> {
        let path = self.resolve(id)?;
        let dataset_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(id)
            .to_string();
        self.load_path(&path, &dataset_id)
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn cell_from_value(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Boolean(b) => CellValue::Bool(b),
        Value::TinyInt(v) => CellValue::Int(v.into()),
        Value::SmallInt(v) => CellValue::Int(v.into()),
        Value::Int(v) => CellValue::Int(v.into()),
        Value::BigInt(v) => CellValue::Int(v),
        Value::Float(v) => CellValue::Float(v.into()),
        Value::Double(v) => CellValue::Float(v),
        Value::Text(s) => CellValue::Text(s),
        other => CellValue::Text(format!("{other:?}")),
    }
}
