use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use sleuth_config::SleuthConfig;
use sleuth_core::capability::DatasetSource;
use sleuth_core::entities::Issue;
use sleuth_investigate::orchestrator::is_eligible;
use sleuth_investigate::{
    BasicHeuristics, BatchError, InvestigationOrchestrator, InvestigationRunner, RunnerSettings,
    SampleSelector, apply_heuristics,
};
use sleuth_lake::DatasetStore;
use sleuth_remote::{AnthropicClient, AnthropicGenerator, SandboxClient};
use tokio_util::sync::CancellationToken;

use crate::bootstrap::data_dir;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::InvestigateArgs;
use crate::output::output;
use crate::progress::BatchProgress;

/// Accepted shapes of the issue file.
#[derive(Deserialize)]
#[serde(untagged)]
enum IssueFile {
    List(Vec<Issue>),
    Wrapped { issues: Vec<Issue> },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    total: usize,
    eligible: usize,
    succeeded: usize,
    failed: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    dataset: String,
    issues: Vec<Issue>,
    summary: Summary,
    fallback: bool,
    completed_at: String,
}

/// Handle `sleuth investigate`.
pub async fn handle(
    args: &InvestigateArgs,
    config: &SleuthConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let issues = load_issues(&args.issues)?;

    let mut orchestrator_config = config.orchestrator.clone();
    orchestrator_config.investigate_all |= args.all;
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 {
            bail!("--concurrency must be at least 1");
        }
        orchestrator_config.max_concurrency = concurrency;
    }
    let investigate_all = orchestrator_config.investigate_all;

    let store = DatasetStore::open_in_memory(data_dir(flags))?;
    let dataset = Arc::new(
        store
            .load_dataset(&args.dataset)
            .with_context(|| format!("failed to load dataset '{}'", args.dataset))?,
    );

    let anthropic = config.require_anthropic()?.clone();
    let client = AnthropicClient::new(anthropic)?;
    let generator = AnthropicGenerator::new(client.clone(), &config.generation);
    let sandbox = SandboxClient::new(client, config.sandbox.clone());

    let eligible = issues
        .iter()
        .filter(|issue| is_eligible(issue, investigate_all))
        .count();
    let progress = Arc::new(BatchProgress::new(eligible));

    let runner = InvestigationRunner::new(
        SampleSelector::new(config.sampling.clone()),
        Arc::new(generator),
        Arc::new(sandbox),
        RunnerSettings::from_config(&config.generation, &config.sandbox),
    )
    .with_progress(progress.clone());
    let orchestrator = InvestigationOrchestrator::new(runner, orchestrator_config);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling investigations");
            interrupt.cancel();
        }
    });

    let (issues, fallback) = match orchestrator
        .investigate(Arc::clone(&dataset), &issues, &cancel)
        .await
    {
        Ok(enriched) => {
            progress.progress().finish_ok("done");
            (enriched, false)
        }
        Err(err) if args.no_fallback => {
            progress.progress().finish_err(&err.to_string());
            tracing::warn!(error = %err, "batch failed, fallback disabled");
            (err.into_issues(), false)
        }
        Err(err) => {
            progress.progress().finish_err(&err.to_string());
            let cancelled = matches!(err, BatchError::Cancelled { .. });
            tracing::warn!(error = %err, cancelled, "batch failed, using heuristic checks");
            let issues =
                apply_heuristics(&BasicHeuristics, &dataset, err.into_issues(), investigate_all);
            (issues, true)
        }
    };

    let report = Report {
        dataset: dataset.id().to_string(),
        summary: summarize(&issues, eligible),
        issues,
        fallback,
        completed_at: chrono::Utc::now().to_rfc3339(),
    };
    output(&report, flags.format)
}

fn summarize(issues: &[Issue], eligible: usize) -> Summary {
    let investigated = issues.iter().filter_map(|issue| issue.investigation.as_ref());
    let succeeded = investigated.clone().filter(|inv| inv.success).count();
    let failed = investigated.filter(|inv| !inv.success).count();
    Summary {
        total: issues.len(),
        eligible,
        succeeded,
        failed,
    }
}

fn load_issues(source: &str) -> anyhow::Result<Vec<Issue>> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read issues from stdin")?;
        buf
    } else {
        let path = Path::new(source);
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read issues from {}", path.display()))?
    };
    parse_issues(&text)
}

fn parse_issues(text: &str) -> anyhow::Result<Vec<Issue>> {
    let file: IssueFile =
        serde_json::from_str(text).context("issues must be a JSON array or {\"issues\": [...]}")?;
    Ok(match file {
        IssueFile::List(issues) | IssueFile::Wrapped { issues } => issues,
    })
}
