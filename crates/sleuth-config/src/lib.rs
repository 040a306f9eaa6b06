//! # sleuth-config
//!
//! Layered configuration loading for Sleuth using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SLEUTH_*` prefix, `__` as separator)
//! 2. Project-level `.sleuth/config.toml`
//! 3. User-level `~/.config/sleuth/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SLEUTH_SAMPLING__TOKEN_BUDGET` -> `sampling.token_budget`,
//! `SLEUTH_ANTHROPIC__API_KEY` -> `anthropic.api_key`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! Each pipeline component takes its own section in its constructor; nothing
//! reads configuration from ambient global state.
//!
//! # Usage
//!
//! ```no_run
//! use sleuth_config::SleuthConfig;
//!
//! let config = SleuthConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//!
//! if config.anthropic.is_configured() {
//!     println!("model: {}", config.anthropic.model);
//! }
//! ```

mod anthropic;
mod error;
mod pipeline;
mod sampling;

pub use anthropic::AnthropicConfig;
pub use error::ConfigError;
pub use pipeline::{GenerationConfig, OrchestratorConfig, SandboxConfig};
pub use sampling::SamplingConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SleuthConfig {
    #[serde(default)]
    pub anthropic: AnthropicConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

impl SleuthConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on
    /// top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".sleuth/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("SLEUTH_").split("__"))
    }

    /// Reject values that would make the pipeline divide by zero or stall.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        if self.sampling.token_budget == 0 {
            return Err(invalid("sampling.token_budget", "must be greater than zero"));
        }
        if self.sampling.estimate_rows == 0 {
            return Err(invalid("sampling.estimate_rows", "must be greater than zero"));
        }
        if !(self.sampling.chars_per_token.is_finite() && self.sampling.chars_per_token > 0.0) {
            return Err(invalid("sampling.chars_per_token", "must be a positive number"));
        }
        if self.sampling.field_char_cap == 0 {
            return Err(invalid("sampling.field_char_cap", "must be greater than zero"));
        }
        if self.orchestrator.max_concurrency == 0 {
            return Err(invalid("orchestrator.max_concurrency", "must be at least 1"));
        }
        if self.generation.timeout_secs == 0 {
            return Err(invalid("generation.timeout_secs", "must be greater than zero"));
        }
        if self.sandbox.timeout_secs == 0 {
            return Err(invalid("sandbox.timeout_secs", "must be greater than zero"));
        }
        Ok(())
    }

    /// Fail unless the Anthropic section can authenticate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when no API key is set.
    pub fn require_anthropic(&self) -> Result<&AnthropicConfig, ConfigError> {
        if self.anthropic.is_configured() {
            Ok(&self.anthropic)
        } else {
            Err(ConfigError::NotConfigured {
                section: "anthropic".to_string(),
            })
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sleuth").join("config.toml"))
    }

    /// Load `.env` from the crate/workspace root or the current directory.
    ///
    /// Silently does nothing if no `.env` is found.
    fn load_dotenv() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
