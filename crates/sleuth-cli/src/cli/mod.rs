use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `sleuth` binary.
#[derive(Debug, Parser)]
#[command(
    name = "sleuth",
    version,
    about = "Sleuth - evidence-backed data-quality investigations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only, no progress)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding datasets (defaults to the current directory)
    #[arg(short, long, global = true)]
    pub data_dir: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            data_dir: self.data_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::root_commands::SchemaType;
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn investigate_parses_with_global_flags() {
        let cli = Cli::try_parse_from([
            "sleuth",
            "--format",
            "raw",
            "investigate",
            "sales",
            "--issues",
            "issues.json",
            "--concurrency",
            "2",
            "--verbose",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.verbose);
        let Commands::Investigate(args) = cli.command else {
            panic!("expected investigate");
        };
        assert_eq!(args.dataset, "sales");
        assert_eq!(args.issues, "issues.json");
        assert_eq!(args.concurrency, Some(2));
        assert!(!args.all);
    }

    #[test]
    fn investigate_requires_issues() {
        assert!(Cli::try_parse_from(["sleuth", "investigate", "sales"]).is_err());
    }

    #[test]
    fn schema_accepts_known_types_only() {
        let cli = Cli::try_parse_from(["sleuth", "schema", "investigation"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Schema(ref args) if args.type_name == SchemaType::Investigation
        ));
        assert!(Cli::try_parse_from(["sleuth", "schema", "dataset"]).is_err());
    }

    #[test]
    fn data_dir_parses_after_subcommand() {
        let cli = Cli::try_parse_from(["sleuth", "sample", "sales", "--data-dir", "/tmp/data"])
            .expect("cli should parse");
        assert_eq!(cli.global_flags().data_dir.as_deref(), Some("/tmp/data"));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["sleuth", "--format", "xml", "config"]).is_err());
    }
}
