//! One hypothesis through sample → generate → execute → parse.
//!
//! Every failure, timeout, cancellation, or panic inside a run ends as a
//! failed [`Investigation`]; `run` itself never errors.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use sleuth_config::{GenerationConfig, SandboxConfig};
use sleuth_core::capability::{
    ExecuteCapability, GenerateCapability, NoopProgress, ProgressSink,
};
use sleuth_core::dataset::Dataset;
use sleuth_core::entities::{
    ExecutionOutcome, GeneratedScript, Hypothesis, Investigation, SampleDescriptor,
};
use sleuth_core::enums::{ColumnType, FailureKind, InvestigationStage, ProgressKind};
use sleuth_core::errors::GenerationError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::parser::OutputParser;
use crate::sampling::SampleSelector;
use crate::script::ScriptGenerator;

pub const EMPTY_DATASET: &str = "dataset is empty; cannot investigate";
pub const CANCELLED: &str = "investigation cancelled";

/// Timeouts and retry counts for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerSettings {
    pub generate_timeout: Duration,
    /// Extra generate attempts after the first.
    pub generate_retries: u32,
    pub retry_delay: Duration,
    /// Sandbox ceiling plus grace.
    pub execute_timeout: Duration,
    pub execute_retries: u32,
}

impl RunnerSettings {
    #[must_use]
    pub const fn from_config(generation: &GenerationConfig, sandbox: &SandboxConfig) -> Self {
        Self {
            generate_timeout: Duration::from_secs(generation.timeout_secs),
            generate_retries: generation.max_retries,
            retry_delay: Duration::from_millis(generation.retry_delay_ms),
            execute_timeout: Duration::from_secs(sandbox.timeout_secs.saturating_add(sandbox.grace_secs)),
            execute_retries: sandbox.max_retries,
        }
    }
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default(), &SandboxConfig::default())
    }
}

/// Current stage of a run, readable after a panic unwinds the run future.
struct StageTracker(Mutex<InvestigationStage>);

impl StageTracker {
    const fn new() -> Self {
        Self(Mutex::new(InvestigationStage::Sampling))
    }

    fn current(&self) -> InvestigationStage {
        self.0
            .lock()
            .map_or(InvestigationStage::Failed, |stage| *stage)
    }

    fn advance(&self, next: InvestigationStage) {
        if let Ok(mut stage) = self.0.lock() {
            debug_assert!(
                stage.can_transition_to(next),
                "illegal stage transition {} -> {next}",
                *stage
            );
            *stage = next;
        }
    }
}

/// Why a stage stopped the run early.
struct StageFailure {
    error: String,
    attempts: u32,
}

impl StageFailure {
    fn cancelled(attempts: u32) -> Self {
        Self {
            error: CANCELLED.to_string(),
            attempts,
        }
    }
}

/// Drives a single investigation. Cheap to share by reference across a batch.
pub struct InvestigationRunner {
    selector: SampleSelector,
    generator: ScriptGenerator,
    executor: Arc<dyn ExecuteCapability>,
    progress: Arc<dyn ProgressSink>,
    settings: RunnerSettings,
}

impl InvestigationRunner {
    #[must_use]
    pub fn new(
        selector: SampleSelector,
        generate: Arc<dyn GenerateCapability>,
        executor: Arc<dyn ExecuteCapability>,
        settings: RunnerSettings,
    ) -> Self {
        Self {
            selector,
            generator: ScriptGenerator::new(generate),
            executor,
            progress: Arc::new(NoopProgress),
            settings,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub const fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// Investigate one hypothesis against `dataset`.
    pub async fn run(
        &self,
        dataset: &Dataset,
        hypothesis: &Hypothesis,
        cancel: &CancellationToken,
    ) -> Investigation {
        let started = Instant::now();
        let tracker = StageTracker::new();

        let result = AssertUnwindSafe(self.drive(dataset, hypothesis, cancel, &tracker))
            .catch_unwind()
            .await;

        let investigation = match result {
            Ok(investigation) => investigation,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| String::from("unknown panic"));
                tracing::error!(hypothesis_id = %hypothesis.id, %message, "investigation panicked");
                Investigation::failed(
                    tracker.current(),
                    format!("investigation panicked: {message}"),
                )
            }
        }
        .with_duration(started.elapsed());

        tracing::info!(
            hypothesis_id = %hypothesis.id,
            success = investigation.success,
            stage = %investigation.stage,
            duration_ms = investigation.duration_ms,
            "investigation complete"
        );
        self.progress.emit(
            ProgressKind::InvestigationComplete,
            &format!(
                "{}: {}",
                hypothesis.id,
                if investigation.success { "succeeded" } else { "failed" }
            ),
        );
        investigation
    }

    async fn drive(
        &self,
        dataset: &Dataset,
        hypothesis: &Hypothesis,
        cancel: &CancellationToken,
        tracker: &StageTracker,
    ) -> Investigation {
        if cancel.is_cancelled() {
            return Investigation::failed(InvestigationStage::Sampling, CANCELLED);
        }

        let sample = self.selector.select(dataset);
        let descriptor = sample.descriptor.clone();
        self.progress.emit(
            ProgressKind::SampleComputed,
            &format!(
                "{}: {} rows, ~{} tokens",
                hypothesis.id, descriptor.row_count, descriptor.estimated_tokens
            ),
        );
        if descriptor.is_empty() {
            return Investigation::failed(InvestigationStage::Sampling, EMPTY_DATASET)
                .with_sample(descriptor);
        }

        tracker.advance(InvestigationStage::Generating);
        let schema = dataset.column_types();
        let (script, attempts) = match self
            .generate_with_retry(hypothesis, &schema, &descriptor, cancel)
            .await
        {
            Ok(generated) => generated,
            Err(failure) => {
                return Investigation {
                    generation_attempts: failure.attempts,
                    ..Investigation::failed(InvestigationStage::Generating, failure.error)
                        .with_sample(descriptor)
                };
            }
        };
        self.progress.emit(
            ProgressKind::ScriptGenerated,
            &format!("{}: script {}", hypothesis.id, script.fingerprint()),
        );

        let fingerprint = Some(script.fingerprint().to_string());
        let failed_at = |stage: InvestigationStage, error: String| Investigation {
            code: script.text().to_string(),
            generation_attempts: attempts,
            fingerprint: fingerprint.clone(),
            ..Investigation::failed(stage, error).with_sample(descriptor.clone())
        };

        tracker.advance(InvestigationStage::Executing);
        self.progress.emit(
            ProgressKind::ExecutionStarted,
            &format!("{}: {} rows", hypothesis.id, descriptor.row_count),
        );
        let outcome = match self
            .execute_with_retry(hypothesis, &script, &sample.payload, cancel)
            .await
        {
            Ok(outcome) => outcome,
            Err(failure) => return failed_at(InvestigationStage::Executing, failure.error),
        };

        if !outcome.success {
            return Investigation {
                failure: outcome.failure,
                raw_output: outcome.raw_output,
                ..failed_at(
                    InvestigationStage::Executing,
                    outcome
                        .error
                        .unwrap_or_else(|| String::from("execution failed")),
                )
            };
        }

        tracker.advance(InvestigationStage::Parsing);
        let raw = outcome.raw_output.unwrap_or_default();
        match OutputParser::parse(&raw) {
            Ok(record) => {
                tracker.advance(InvestigationStage::Succeeded);
                Investigation {
                    generation_attempts: attempts,
                    fingerprint: fingerprint.clone(),
                    ..Investigation::succeeded(script.text(), record)
                        .with_sample(descriptor.clone())
                }
            }
            Err(failure) => {
                tracing::warn!(hypothesis_id = %hypothesis.id, error = %failure.error, "unparseable script output");
                Investigation {
                    raw_output: Some(failure.raw.clone()),
                    ..failed_at(InvestigationStage::Parsing, failure.to_string())
                }
            }
        }
    }

    async fn generate_with_retry(
        &self,
        hypothesis: &Hypothesis,
        schema: &BTreeMap<String, ColumnType>,
        descriptor: &SampleDescriptor,
        cancel: &CancellationToken,
    ) -> Result<(GeneratedScript, u32), StageFailure> {
        let max_attempts = self.settings.generate_retries.saturating_add(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            let call = tokio::time::timeout(
                self.settings.generate_timeout,
                self.generator.generate(hypothesis, schema, descriptor),
            );
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(StageFailure::cancelled(attempt)),
                result = call => result,
            };

            match result {
                Ok(Ok(script)) => {
                    tracing::debug!(hypothesis_id = %hypothesis.id, attempt, fingerprint = script.fingerprint(), "script generated");
                    return Ok((script, attempt));
                }
                Ok(Err(err)) => last_error = err.to_string(),
                Err(_) => {
                    last_error = GenerationError::Timeout {
                        secs: self.settings.generate_timeout.as_secs(),
                    }
                    .to_string();
                }
            }
            tracing::warn!(hypothesis_id = %hypothesis.id, attempt, error = %last_error, "script generation failed");

            if attempt < max_attempts {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(StageFailure::cancelled(attempt)),
                    () = tokio::time::sleep(self.settings.retry_delay) => {}
                }
            }
        }

        Err(StageFailure {
            error: last_error,
            attempts: max_attempts,
        })
    }

    async fn execute_with_retry(
        &self,
        hypothesis: &Hypothesis,
        script: &GeneratedScript,
        payload: &str,
        cancel: &CancellationToken,
    ) -> Result<ExecutionOutcome, StageFailure> {
        let max_attempts = self.settings.execute_retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let started = Instant::now();
            let call = tokio::time::timeout(
                self.settings.execute_timeout,
                self.executor.execute(script.text(), payload),
            );
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(StageFailure::cancelled(attempt)),
                result = call => result.unwrap_or_else(|_| {
                    ExecutionOutcome::failed(
                        FailureKind::Timeout,
                        format!(
                            "execution timed out after {}s",
                            self.settings.execute_timeout.as_secs()
                        ),
                        started.elapsed(),
                    )
                }),
            };

            if outcome.success || attempt >= max_attempts {
                return Ok(outcome);
            }
            tracing::warn!(
                hypothesis_id = %hypothesis.id,
                attempt,
                failure = outcome.failure.map_or("unknown", FailureKind::as_str),
                "execution failed, retrying"
            );
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(StageFailure::cancelled(attempt)),
                () = tokio::time::sleep(self.settings.retry_delay) => {}
            }
        }
    }
}
