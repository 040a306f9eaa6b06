//! Text-generation capability backed by the Messages API.

use std::time::Duration;

use async_trait::async_trait;
use sleuth_config::{AnthropicConfig, GenerationConfig};
use sleuth_core::capability::GenerateCapability;
use sleuth_core::errors::GenerationError;

use crate::AnthropicClient;
use crate::error::RemoteError;
use crate::messages::MessagesRequest;

/// Plain completion client used to write analysis scripts.
///
/// Makes exactly one request per call. Retry policy belongs to the caller.
#[derive(Debug, Clone)]
pub struct AnthropicGenerator {
    client: AnthropicClient,
    timeout: Duration,
}

impl AnthropicGenerator {
    #[must_use]
    pub const fn new(client: AnthropicClient, generation: &GenerationConfig) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(generation.timeout_secs),
        }
    }

    /// Build the generator straight from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::NotConfigured`] without an API key.
    pub fn from_config(
        anthropic: AnthropicConfig,
        generation: &GenerationConfig,
    ) -> Result<Self, RemoteError> {
        Ok(Self::new(AnthropicClient::new(anthropic)?, generation))
    }

    fn map_error(&self, err: RemoteError) -> GenerationError {
        if err.is_timeout() {
            return GenerationError::Timeout {
                secs: self.timeout.as_secs(),
            };
        }
        match err {
            RemoteError::Http(e) => GenerationError::Transport(e.to_string()),
            RemoteError::Api { status, message } => GenerationError::Api { status, message },
            RemoteError::RateLimited { retry_after_secs }
            | RemoteError::Overloaded { retry_after_secs } => {
                GenerationError::RateLimited { retry_after_secs }
            }
            RemoteError::Parse(msg) => GenerationError::Transport(msg),
            RemoteError::NotConfigured(msg) => GenerationError::NotConfigured(msg),
        }
    }
}

#[async_trait]
impl GenerateCapability for AnthropicGenerator {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        let config = self.client.config();
        let request = MessagesRequest::new(&config.model, config.max_tokens, config.temperature)
            .system(system)
            .user(user);

        let response = self
            .client
            .create_message(&request, None, self.timeout)
            .await
            .map_err(|e| self.map_error(e))?;

        tracing::debug!(
            model = %config.model,
            stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
            "generation response received"
        );

        let text = response.text();
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> AnthropicGenerator {
        let anthropic = AnthropicConfig {
            api_key: "sk-ant-test".into(),
            ..Default::default()
        };
        AnthropicGenerator::from_config(anthropic, &GenerationConfig::default()).unwrap()
    }

    #[test]
    fn api_errors_keep_status() {
        let err = generator().map_error(RemoteError::Api {
            status: 529,
            message: "overloaded".into(),
        });
        assert_eq!(
            err,
            GenerationError::Api {
                status: 529,
                message: "overloaded".into()
            }
        );
    }

    #[test]
    fn rate_limits_and_parse_failures_are_mapped() {
        let g = generator();
        assert_eq!(
            g.map_error(RemoteError::RateLimited {
                retry_after_secs: 7
            }),
            GenerationError::RateLimited {
                retry_after_secs: 7
            }
        );
        assert_eq!(
            g.map_error(RemoteError::Overloaded {
                retry_after_secs: 5
            }),
            GenerationError::RateLimited {
                retry_after_secs: 5
            }
        );
        assert!(matches!(
            g.map_error(RemoteError::Parse("eof".into())),
            GenerationError::Transport(_)
        ));
    }

    #[test]
    fn from_config_requires_key() {
        let err = AnthropicGenerator::from_config(
            AnthropicConfig::default(),
            &GenerationConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RemoteError::NotConfigured(_)));
    }
}
