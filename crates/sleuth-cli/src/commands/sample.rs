use anyhow::Context;
use sleuth_config::SleuthConfig;
use sleuth_core::capability::DatasetSource;
use sleuth_investigate::SampleSelector;
use sleuth_lake::DatasetStore;

use crate::bootstrap::data_dir;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::SampleArgs;
use crate::output::output;
use crate::progress::Progress;

/// Handle `sleuth sample`.
pub fn handle(args: &SampleArgs, config: &SleuthConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut sampling = config.sampling.clone();
    if let Some(budget) = args.budget {
        anyhow::ensure!(budget > 0, "--budget must be greater than zero");
        sampling.token_budget = budget;
    }
    if let Some(rows) = args.rows {
        sampling.target_rows = rows;
    }

    let spinner = Progress::spinner(&format!("loading {}", args.dataset));
    let store = DatasetStore::open_in_memory(data_dir(flags))?;
    let dataset = store
        .load_dataset(&args.dataset)
        .with_context(|| format!("failed to load dataset '{}'", args.dataset))?;
    spinner.set_message("sampling");
    let sample = SampleSelector::new(sampling).select(&dataset);
    spinner.finish_clear();

    if args.payload {
        print!("{}", sample.payload);
        Ok(())
    } else {
        output(&sample.descriptor, flags.format)
    }
}
