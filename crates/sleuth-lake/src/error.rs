//! Lake error types.

/// Errors that can occur while locating or loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum LakeError {
    /// `DuckDB` operation failed.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// No file could be resolved for the dataset identifier.
    #[error("Dataset not found: {id} (looked in {root})")]
    DatasetNotFound {
        /// Identifier or path as given by the caller.
        id: String,
        /// Directory that was searched.
        root: String,
    },

    /// I/O error while resolving dataset files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file exists but is not a format the store can read.
    #[error("Unsupported dataset format: {0}")]
    Unsupported(String),

    /// The loaded table failed validation.
    #[error(transparent)]
    Core(#[from] sleuth_core::errors::CoreError),
}
