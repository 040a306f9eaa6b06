use std::path::PathBuf;

use anyhow::Context;
use sleuth_config::SleuthConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, layered config, and the `ANTHROPIC_API_KEY` fallback.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<SleuthConfig> {
    load_dotenv(flags)?;

    let config = SleuthConfig::load().context("failed to load sleuth configuration")?;
    let config = with_api_key_fallback(config, std::env::var("ANTHROPIC_API_KEY").ok());
    config.validate()?;
    Ok(config)
}

/// Use the conventional `ANTHROPIC_API_KEY` when no `SLEUTH_` key is set.
#[must_use]
pub fn with_api_key_fallback(mut config: SleuthConfig, env_key: Option<String>) -> SleuthConfig {
    if !config.anthropic.is_configured() {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            config.anthropic.api_key = key;
        }
    }
    config
}

/// Directory datasets are resolved against.
#[must_use]
pub fn data_dir(flags: &GlobalFlags) -> PathBuf {
    flags
        .data_dir
        .as_deref()
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
}

fn load_dotenv(flags: &GlobalFlags) -> anyhow::Result<()> {
    if let Some(dir) = &flags.data_dir {
        let env_path = PathBuf::from(dir).join(".env");
        if env_path.exists() {
            dotenvy::from_path(&env_path)
                .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
            return Ok(());
        }
    }

    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(error) if error.not_found() => Ok(()),
        Err(error) => Err(anyhow::Error::from(error).context("failed to load .env")),
    }
}
