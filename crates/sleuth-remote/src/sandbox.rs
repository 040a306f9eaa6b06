//! Remote execution through the hosted code-execution tool.
//!
//! The payload and the script are uploaded through the Files API and
//! attached as `container_upload` blocks, so they land in the container as
//! `data.csv` and `analysis.py` without the model ever re-typing them. A
//! fixed harness prompt then asks for a single `python analysis.py` run.
//! The response is classified by [`classify_response`], which only trusts
//! explicit tool-result blocks. A model that answers in prose without ever
//! running the tool is a `tool_not_invoked` failure even on HTTP 200.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use sleuth_config::SandboxConfig;
use sleuth_core::capability::ExecuteCapability;
use sleuth_core::entities::ExecutionOutcome;
use sleuth_core::enums::FailureKind;

use crate::AnthropicClient;
use crate::error::RemoteError;
use crate::messages::{CODE_EXECUTION_TOOL_NAME, InputBlock, MessagesRequest, MessagesResponse};

/// Result block types that carry an execution result.
const EXECUTION_RESULT_BLOCKS: &[&str] = &[
    "bash_code_execution_tool_result",
    "code_execution_tool_result",
];

/// Server-side error code for the sandbox wall-clock ceiling.
const EXECUTION_TIME_EXCEEDED: &str = "execution_time_exceeded";

/// Stop reason reported when the response hit `max_tokens`.
const STOP_MAX_TOKENS: &str = "max_tokens";

const DATA_FILE: &str = "data.csv";
const SCRIPT_FILE: &str = "analysis.py";

/// Deadline for deleting staged files once a run is over.
const CLEANUP_TIMEOUT: Duration = Duration::from_secs(10);

const HARNESS_SYSTEM: &str = "You are a code execution harness. You never analyze data yourself \
and never modify the files you are given.\n\
Two files were uploaded to the container: data.csv and analysis.py.\n\
Using the code execution tool:\n\
1. Change to the directory that holds both files, locating them first if they are not in the \
working directory.\n\
2. Run `python analysis.py`.\n\
Do not create, edit or delete any file and do not run any other commands. After the run, reply \
with the single word DONE.";

const HARNESS_INSTRUCTION: &str = "Run analysis.py against data.csv.";

/// [`ExecuteCapability`] over the Messages API code-execution tool.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: AnthropicClient,
    config: SandboxConfig,
}

impl SandboxClient {
    #[must_use]
    pub const fn new(client: AnthropicClient, config: SandboxConfig) -> Self {
        Self { client, config }
    }

    fn harness_blocks(data_file_id: &str, script_file_id: &str) -> Vec<InputBlock> {
        vec![
            InputBlock::Text {
                text: HARNESS_INSTRUCTION.to_string(),
            },
            InputBlock::ContainerUpload {
                file_id: data_file_id.to_string(),
            },
            InputBlock::ContainerUpload {
                file_id: script_file_id.to_string(),
            },
        ]
    }

    /// Both betas are needed once the request references uploaded files.
    fn messages_beta(&self) -> String {
        format!("{},{}", self.config.beta, self.config.files_beta)
    }

    /// Upload both inputs, then run the harness.
    ///
    /// Every uploaded file id is pushed to `staged` as soon as it exists, so
    /// the caller can clean up even when this future is dropped mid-way.
    async fn run_staged(
        &self,
        script: &str,
        payload: &str,
        timeout: Duration,
        staged: &mut Vec<String>,
    ) -> Result<MessagesResponse, RemoteError> {
        let data = self
            .client
            .upload_file(
                DATA_FILE,
                "text/csv",
                payload.as_bytes().to_vec(),
                &self.config.files_beta,
                timeout,
            )
            .await?;
        staged.push(data.id.clone());

        let code = self
            .client
            .upload_file(
                SCRIPT_FILE,
                "text/x-python",
                script.as_bytes().to_vec(),
                &self.config.files_beta,
                timeout,
            )
            .await?;
        staged.push(code.id.clone());

        tracing::debug!(
            data_file = %data.id,
            script_file = %code.id,
            data_bytes = data.size_bytes.unwrap_or(0),
            "sandbox inputs staged"
        );

        let config = self.client.config();
        let request = MessagesRequest::new(&config.model, config.max_tokens, 0.0)
            .system(HARNESS_SYSTEM)
            .user_blocks(Self::harness_blocks(&data.id, &code.id))
            .tool(&self.config.tool_type, CODE_EXECUTION_TOOL_NAME);
        let beta = self.messages_beta();
        self.client
            .create_message(&request, Some(&beta), timeout)
            .await
    }

    /// Delete staged files in the background; failures are only logged.
    fn cleanup(&self, staged: Vec<String>) {
        if staged.is_empty() {
            return;
        }
        let client = self.client.clone();
        let beta = self.config.files_beta.clone();
        tokio::spawn(async move {
            for file_id in staged {
                if let Err(err) = client.delete_file(&file_id, &beta, CLEANUP_TIMEOUT).await {
                    tracing::debug!(file_id = %file_id, error = %err, "failed to delete staged file");
                }
            }
        });
    }

    fn transport_failure(&self, err: &RemoteError, duration: Duration) -> ExecutionOutcome {
        if err.is_timeout() {
            return ExecutionOutcome::failed(
                FailureKind::Timeout,
                format!("execution timed out after {}s", self.config.timeout_secs),
                duration,
            );
        }
        if err.is_backoff() || matches!(err, RemoteError::Api { .. }) {
            ExecutionOutcome::failed(FailureKind::RemoteError, err.to_string(), duration)
        } else {
            ExecutionOutcome::failed(FailureKind::Transport, err.to_string(), duration)
        }
    }
}

#[async_trait]
impl ExecuteCapability for SandboxClient {
    async fn execute(&self, script: &str, payload: &str) -> ExecutionOutcome {
        let timeout = Duration::from_secs(self.config.timeout_secs);

        tracing::debug!(
            payload_bytes = payload.len(),
            script_bytes = script.len(),
            timeout_secs = self.config.timeout_secs,
            "submitting script to sandbox"
        );

        let started = Instant::now();
        let mut staged = Vec::new();
        let result =
            tokio::time::timeout(timeout, self.run_staged(script, payload, timeout, &mut staged))
                .await;
        let elapsed = started.elapsed();
        self.cleanup(staged);

        match result {
            Err(_) => ExecutionOutcome::failed(
                FailureKind::Timeout,
                format!("execution timed out after {}s", self.config.timeout_secs),
                elapsed,
            ),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "sandbox request failed");
                self.transport_failure(&err, elapsed)
            }
            Ok(Ok(response)) => classify_response(&response, elapsed),
        }
    }
}

/// Classify a decoded response into exactly one execution outcome.
///
/// The last execution result block wins, since the harness writes its input
/// files before running the script. Pure, so it can be tested on fixtures.
/// A response cut off at `max_tokens` is a `token_limit` failure whatever
/// blocks it holds, since the run it describes may never have happened.
#[must_use]
pub fn classify_response(response: &MessagesResponse, duration: Duration) -> ExecutionOutcome {
    let result = response
        .content
        .iter()
        .rev()
        .filter(|b| EXECUTION_RESULT_BLOCKS.contains(&b.block_type.as_str()))
        .find_map(|b| b.content.as_ref());

    if response.stop_reason.as_deref() == Some(STOP_MAX_TOKENS) {
        let outcome = ExecutionOutcome::failed(
            FailureKind::TokenLimit,
            "sandbox response stopped at max_tokens before the run completed",
            duration,
        );
        let stdout = result
            .and_then(|r| r.get("stdout"))
            .and_then(Value::as_str)
            .unwrap_or("");
        return if stdout.is_empty() {
            outcome
        } else {
            outcome.with_raw_output(stdout)
        };
    }

    let Some(result) = result else {
        let reply = response.text();
        let detail = if reply.trim().is_empty() {
            String::from("no execution result in response")
        } else {
            format!("no execution result in response: {}", truncate(&reply, 200))
        };
        return ExecutionOutcome::failed(FailureKind::ToolNotInvoked, detail, duration);
    };

    let result_type = result.get("type").and_then(Value::as_str).unwrap_or("");
    if result_type.ends_with("_error") {
        let code = result
            .get("error_code")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let kind = if code == EXECUTION_TIME_EXCEEDED {
            FailureKind::Timeout
        } else {
            FailureKind::RemoteError
        };
        return ExecutionOutcome::failed(kind, format!("sandbox error: {code}"), duration);
    }

    let stdout = result.get("stdout").and_then(Value::as_str).unwrap_or("");
    let stderr = result.get("stderr").and_then(Value::as_str).unwrap_or("");
    let return_code = result.get("return_code").and_then(Value::as_i64).unwrap_or(0);

    if return_code != 0 {
        let error = if stderr.trim().is_empty() {
            format!("script exited with code {return_code}")
        } else {
            format!("script exited with code {return_code}: {}", stderr.trim())
        };
        let outcome = ExecutionOutcome::failed(FailureKind::RemoteError, error, duration);
        return if stdout.is_empty() {
            outcome
        } else {
            outcome.with_raw_output(stdout)
        };
    }

    ExecutionOutcome::succeeded(stdout, duration)
}

fn truncate(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(max_chars).collect();
        format!("{head}…")
    }
}
