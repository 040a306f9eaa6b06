//! Narrow interfaces to the external collaborators.
//!
//! The runner and orchestrator only ever see these traits, injected as
//! `Arc<dyn …>`, so tests can substitute deterministic fakes for the
//! text-generation and remote-execution services.

use async_trait::async_trait;

use crate::dataset::Dataset;
use crate::entities::{ExecutionOutcome, Hypothesis, Investigation};
use crate::enums::ProgressKind;
use crate::errors::GenerationError;

/// Text-generation capability: `generate(system, user) -> text`.
///
/// Stateless and safe to call repeatedly with the same input. Sampling
/// temperature and model choice belong to the implementation's config.
#[async_trait]
pub trait GenerateCapability: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GenerationError>;
}

/// Remote execution capability: run `script` against `payload`.
///
/// Never returns an error; every failure is classified into the returned
/// [`ExecutionOutcome`].
#[async_trait]
pub trait ExecuteCapability: Send + Sync {
    async fn execute(&self, script: &str, payload: &str) -> ExecutionOutcome;
}

/// Dataset access: resolve an identifier to a loaded, validated table.
pub trait DatasetSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the dataset identified by `id`.
    ///
    /// # Errors
    ///
    /// Implementation-specific: missing dataset, unreadable file, etc.
    fn load_dataset(&self, id: &str) -> Result<Dataset, Self::Error>;
}

/// Non-generative fallback used when a whole batch fails.
pub trait HeuristicAnalyzer: Send + Sync {
    fn analyze(&self, dataset: &Dataset, hypothesis: &Hypothesis) -> Investigation;
}

/// Observer for pipeline progress. Never required for correctness.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, kind: ProgressKind, message: &str);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn emit(&self, _kind: ProgressKind, _message: &str) {}
}
