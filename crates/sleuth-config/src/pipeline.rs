//! Generation, sandbox, and orchestration settings.

use serde::{Deserialize, Serialize};

const fn default_generation_timeout_secs() -> u64 {
    45
}

const fn default_generation_retries() -> u32 {
    2
}

const fn default_retry_delay_ms() -> u64 {
    500
}

const fn default_sandbox_timeout_secs() -> u64 {
    60
}

const fn default_grace_secs() -> u64 {
    5
}

fn default_beta() -> String {
    String::from("code-execution-2025-08-25")
}

fn default_files_beta() -> String {
    String::from("files-api-2025-04-14")
}

fn default_tool_type() -> String {
    String::from("code_execution_20250825")
}

const fn default_max_concurrency() -> usize {
    4
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Deadline for a single generate attempt.
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,

    /// Additional attempts after the first failure.
    #[serde(default = "default_generation_retries")]
    pub max_retries: u32,

    /// Fixed pause between attempts.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_generation_timeout_secs(),
            max_retries: default_generation_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SandboxConfig {
    /// Wall-clock ceiling for one remote execution.
    #[serde(default = "default_sandbox_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra time the runner allows on top of `timeout_secs` before it
    /// abandons the call itself.
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,

    /// Execution replays; zero by default since a failing script rarely
    /// succeeds on an identical rerun.
    #[serde(default)]
    pub max_retries: u32,

    /// `anthropic-beta` header enabling the code-execution tool.
    #[serde(default = "default_beta")]
    pub beta: String,

    /// `anthropic-beta` value enabling the Files API used to stage inputs.
    #[serde(default = "default_files_beta")]
    pub files_beta: String,

    /// Tool type identifier sent in the `tools` array.
    #[serde(default = "default_tool_type")]
    pub tool_type: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_sandbox_timeout_secs(),
            grace_secs: default_grace_secs(),
            max_retries: 0,
            beta: default_beta(),
            files_beta: default_files_beta(),
            tool_type: default_tool_type(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrchestratorConfig {
    /// Investigations allowed in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Whole-batch deadline; `0` disables it.
    #[serde(default)]
    pub batch_timeout_secs: u64,

    /// Investigate every issue, not just those flagged `codeInvestigation`.
    #[serde(default)]
    pub investigate_all: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            batch_timeout_secs: 0,
            investigate_all: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let generation = GenerationConfig::default();
        assert_eq!(generation.max_retries, 2);
        assert_eq!(generation.retry_delay_ms, 500);

        let sandbox = SandboxConfig::default();
        assert_eq!(sandbox.timeout_secs, 60);
        assert_eq!(sandbox.max_retries, 0);
        assert_eq!(sandbox.tool_type, "code_execution_20250825");
        assert_eq!(sandbox.files_beta, "files-api-2025-04-14");

        let orchestrator = OrchestratorConfig::default();
        assert_eq!(orchestrator.max_concurrency, 4);
        assert_eq!(orchestrator.batch_timeout_secs, 0);
        assert!(!orchestrator.investigate_all);
    }
}
