use sleuth_config::SleuthConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    config: &SleuthConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Investigate(args) => commands::investigate::handle(&args, config, flags).await,
        Commands::Sample(args) => commands::sample::handle(&args, config, flags),
        Commands::Config => commands::config::handle(config, flags),
        Commands::Schema(args) => commands::schema::handle(&args, flags),
    }
}
