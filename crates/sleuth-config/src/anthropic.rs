//! Anthropic Messages API configuration, shared by the generator and the sandbox.

use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    String::from("https://api.anthropic.com")
}

fn default_model() -> String {
    String::from("claude-sonnet-4-5")
}

fn default_api_version() -> String {
    String::from("2023-06-01")
}

const fn default_max_tokens() -> u32 {
    4096
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnthropicConfig {
    /// API key (`ANTHROPIC_API_KEY` is also honored by the CLI).
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Value of the `anthropic-version` header.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Low temperature keeps generated scripts close to deterministic.
    #[serde(default)]
    pub temperature: f32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            api_version: default_api_version(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
        }
    }
}

impl AnthropicConfig {
    /// An API key is the only field without a usable default.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Messages endpoint URL.
    #[must_use]
    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }

    /// Files API collection URL.
    #[must_use]
    pub fn files_url(&self) -> String {
        format!("{}/v1/files", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = AnthropicConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.messages_url(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn messages_url_tolerates_trailing_slash() {
        let config = AnthropicConfig {
            base_url: "http://localhost:8080/".into(),
            api_key: "sk-ant-test".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
        assert_eq!(config.messages_url(), "http://localhost:8080/v1/messages");
        assert_eq!(config.files_url(), "http://localhost:8080/v1/files");
    }
}
