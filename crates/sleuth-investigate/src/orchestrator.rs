//! Concurrent fan-out of investigations over a batch of issues.
//!
//! Runners are plain futures polled together by `join_all` and gated by a
//! semaphore, so no task is spawned per hypothesis and the dataset can be
//! borrowed. Results land in slots indexed by issue position, which keeps
//! the output in input order whatever the completion order.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use sleuth_config::OrchestratorConfig;
use sleuth_core::dataset::Dataset;
use sleuth_core::entities::{Investigation, Issue};
use sleuth_core::enums::InvestigationStage;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::error::BatchError;
use crate::runner::{CANCELLED, InvestigationRunner};

/// Whether `issue` is investigated in this batch.
#[must_use]
pub const fn is_eligible(issue: &Issue, investigate_all: bool) -> bool {
    investigate_all || issue.code_investigation
}

pub struct InvestigationOrchestrator {
    runner: InvestigationRunner,
    config: OrchestratorConfig,
}

impl InvestigationOrchestrator {
    #[must_use]
    pub const fn new(runner: InvestigationRunner, config: OrchestratorConfig) -> Self {
        Self { runner, config }
    }

    #[must_use]
    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Investigate every eligible issue and return the list enriched in place.
    ///
    /// Cancelling `cancel`, or hitting the configured batch timeout, stops
    /// all in-flight runners; each still yields a failed investigation.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] when at least one issue was eligible and none
    /// of the investigations succeeded.
    pub async fn investigate(
        &self,
        dataset: Arc<Dataset>,
        issues: &[Issue],
        cancel: &CancellationToken,
    ) -> Result<Vec<Issue>, BatchError> {
        let eligible: Vec<usize> = issues
            .iter()
            .enumerate()
            .filter(|(_, issue)| is_eligible(issue, self.config.investigate_all))
            .map(|(idx, _)| idx)
            .collect();

        if eligible.is_empty() {
            tracing::debug!(issues = issues.len(), "no issues eligible for investigation");
            return Ok(issues.to_vec());
        }

        tracing::info!(
            dataset = dataset.id(),
            eligible = eligible.len(),
            max_concurrency = self.config.max_concurrency,
            "starting investigation batch"
        );

        let batch = cancel.child_token();
        let semaphore = Semaphore::new(self.config.max_concurrency.max(1));

        let runs = join_all(eligible.iter().map(|&idx| {
            let hypothesis = issues[idx].hypothesis();
            let dataset = &dataset;
            let semaphore = &semaphore;
            let batch = &batch;
            async move {
                let permit = tokio::select! {
                    biased;
                    () = batch.cancelled() => None,
                    permit = semaphore.acquire() => permit.ok(),
                };
                let investigation = if permit.is_some() {
                    self.runner.run(dataset, &hypothesis, batch).await
                } else {
                    Investigation::failed(InvestigationStage::Sampling, CANCELLED)
                };
                (idx, investigation)
            }
        }));

        let results = match self.batch_timeout() {
            Some(limit) => {
                let mut runs = std::pin::pin!(runs);
                tokio::select! {
                    results = &mut runs => results,
                    () = tokio::time::sleep(limit) => {
                        tracing::warn!(timeout_secs = limit.as_secs(), "investigation batch timed out");
                        batch.cancel();
                        runs.await
                    }
                }
            }
            None => runs.await,
        };

        let mut slots: Vec<Option<Investigation>> = vec![None; issues.len()];
        for (idx, investigation) in results {
            slots[idx] = Some(investigation);
        }

        let mut failures = 0;
        let enriched: Vec<Issue> = issues
            .iter()
            .zip(slots)
            .map(|(issue, slot)| {
                let mut issue = issue.clone();
                if let Some(investigation) = slot {
                    if !investigation.success {
                        failures += 1;
                    }
                    issue.investigation = Some(investigation);
                }
                issue
            })
            .collect();

        tracing::info!(
            eligible = eligible.len(),
            failures,
            "investigation batch complete"
        );

        if failures < eligible.len() {
            Ok(enriched)
        } else if batch.is_cancelled() {
            Err(BatchError::Cancelled { issues: enriched })
        } else {
            Err(BatchError::AllFailed {
                issues: enriched,
                failures,
            })
        }
    }

    fn batch_timeout(&self) -> Option<Duration> {
        (self.config.batch_timeout_secs > 0)
            .then(|| Duration::from_secs(self.config.batch_timeout_secs))
    }
}
