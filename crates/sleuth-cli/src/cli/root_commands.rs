use clap::{Args, Subcommand, ValueEnum};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Investigate flagged issues against a dataset with generated scripts.
    Investigate(InvestigateArgs),
    /// Show the sample that would be sent for a dataset.
    Sample(SampleArgs),
    /// Print the JSON Schema of a boundary type.
    Schema(SchemaArgs),
    /// Print the effective configuration (secrets redacted).
    Config,
}

#[derive(Clone, Debug, Args)]
pub struct InvestigateArgs {
    /// Dataset identifier (file stem under the data dir) or path to a CSV file.
    pub dataset: String,

    /// JSON file with the issue list: an array or `{"issues": [...]}`. Use `-` for stdin.
    #[arg(short, long)]
    pub issues: String,

    /// Investigate every issue, not only those with `codeInvestigation: true`.
    #[arg(long)]
    pub all: bool,

    /// Keep failed investigations instead of falling back to heuristic checks.
    #[arg(long)]
    pub no_fallback: bool,

    /// Override the maximum number of concurrent investigations.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

#[derive(Clone, Debug, Args)]
pub struct SampleArgs {
    /// Dataset identifier or path to a CSV file.
    pub dataset: String,

    /// Override the token budget.
    #[arg(long)]
    pub budget: Option<usize>,

    /// Override the target row cap.
    #[arg(long)]
    pub rows: Option<usize>,

    /// Print the encoded payload instead of the descriptor.
    #[arg(long)]
    pub payload: bool,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    #[arg(value_enum)]
    pub type_name: SchemaType,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    Issue,
    Hypothesis,
    Investigation,
    Sample,
}
