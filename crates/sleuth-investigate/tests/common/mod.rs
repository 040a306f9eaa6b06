//! Deterministic fakes for the remote capabilities.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sleuth_config::SamplingConfig;
use sleuth_core::capability::{ExecuteCapability, GenerateCapability};
use sleuth_core::dataset::{CellValue, Column, Dataset};
use sleuth_core::entities::ExecutionOutcome;
use sleuth_core::enums::{ColumnType, FailureKind};
use sleuth_core::errors::GenerationError;
use sleuth_investigate::{InvestigationRunner, RunnerSettings, SampleSelector};

/// Generator that plays back scripted results, then repeats a default.
pub struct ScriptedGenerator {
    queue: Mutex<VecDeque<Result<String, GenerationError>>>,
    fallback: Result<String, GenerationError>,
    pub calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(
        queue: impl IntoIterator<Item = Result<String, GenerationError>>,
        fallback: Result<String, GenerationError>,
    ) -> Self {
        Self {
            queue: Mutex::new(queue.into_iter().collect()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answers with a script that echoes the hypothesis id line.
    pub fn echo() -> Self {
        Self::new([], Ok(String::from("ECHO")))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerateCapability for ScriptedGenerator {
    async fn generate(&self, _system: &str, user: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        // Scripts carry the hypothesis id so executors can key on it.
        next.map(|script| {
            let id = user
                .lines()
                .find_map(|l| l.strip_prefix("Hypothesis id: "))
                .unwrap_or("unknown");
            format!("# {id}\n{script}")
        })
    }
}

/// Generator that never answers.
pub struct HangingGenerator;

#[async_trait]
impl GenerateCapability for HangingGenerator {
    async fn generate(&self, _system: &str, _user: &str) -> Result<String, GenerationError> {
        std::future::pending().await
    }
}

type Respond = dyn Fn(&str) -> ExecutionOutcome + Send + Sync;

/// Executor that answers through a closure after an optional delay and
/// records peak concurrency.
pub struct FakeExecutor {
    respond: Box<Respond>,
    delay: Duration,
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub calls: AtomicUsize,
}

impl FakeExecutor {
    pub fn new(respond: impl Fn(&str) -> ExecutionOutcome + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Prints a JSON record naming the script's hypothesis.
    pub fn succeeding() -> Self {
        Self::new(|script| {
            let id = script.lines().next().unwrap_or("").trim_start_matches("# ");
            ExecutionOutcome::succeeded(
                format!("running\n{{\"hypothesis\": \"{id}\", \"count\": 3}}\n"),
                Duration::from_millis(5),
            )
        })
    }

    pub fn failing(kind: FailureKind) -> Self {
        Self::new(move |_| ExecutionOutcome::failed(kind, "sandbox down", Duration::ZERO))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecuteCapability for FakeExecutor {
    async fn execute(&self, script: &str, _payload: &str) -> ExecutionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        (self.respond)(script)
    }
}

/// Executor that panics on every call.
pub struct PanickingExecutor;

#[async_trait]
impl ExecuteCapability for PanickingExecutor {
    async fn execute(&self, _script: &str, _payload: &str) -> ExecutionOutcome {
        panic!("sandbox client bug")
    }
}

pub fn sales(rows: usize) -> Dataset {
    let columns = vec![
        Column::new("Sale ID", ColumnType::Numeric),
        Column::new("Product", ColumnType::Categorical),
        Column::new("Turnover", ColumnType::Numeric),
    ];
    let data = (0..rows)
        .map(|r| {
            vec![
                CellValue::Int(i64::try_from(r).unwrap()),
                CellValue::Text(if r % 3 == 0 { "Gadget" } else { "Widget" }.into()),
                CellValue::Float(10.0 + (r % 7) as f64),
            ]
        })
        .collect();
    Dataset::new("sales", columns, data).unwrap()
}

pub fn settings() -> RunnerSettings {
    RunnerSettings {
        generate_timeout: Duration::from_secs(45),
        generate_retries: 2,
        retry_delay: Duration::from_millis(500),
        execute_timeout: Duration::from_secs(65),
        execute_retries: 0,
    }
}

pub fn runner(
    generator: Arc<dyn GenerateCapability>,
    executor: Arc<dyn ExecuteCapability>,
) -> InvestigationRunner {
    InvestigationRunner::new(
        SampleSelector::new(SamplingConfig::default()),
        generator,
        executor,
        settings(),
    )
}
