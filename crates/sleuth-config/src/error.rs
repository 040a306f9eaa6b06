//! Errors raised while loading or checking a [`SleuthConfig`](crate::SleuthConfig).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be read, or a value has the wrong shape.
    #[error("failed to load sleuth config: {0}")]
    Figment(#[from] figment::Error),

    /// A section the command needs has no credentials.
    #[error(
        "[{section}] is not configured; set SLEUTH_{env}__API_KEY or add api_key to .sleuth/config.toml",
        env = .section.to_uppercase()
    )]
    NotConfigured { section: String },

    /// A value would make the pipeline divide by zero or stall.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_configured_names_the_env_var() {
        let err = ConfigError::NotConfigured {
            section: "anthropic".into(),
        };
        assert!(err.to_string().contains("SLEUTH_ANTHROPIC__API_KEY"));
    }

    #[test]
    fn invalid_value_names_the_field() {
        let err = ConfigError::InvalidValue {
            field: "sampling.token_budget".into(),
            reason: "must be greater than zero".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for sampling.token_budget: must be greater than zero"
        );
    }
}
