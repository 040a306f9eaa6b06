//! # sleuth-remote
//!
//! HTTP implementations of Sleuth's two remote capabilities, both backed by
//! the Anthropic Messages API:
//! - [`AnthropicGenerator`]: the text-generation capability used to write
//!   analysis scripts.
//! - [`SandboxClient`]: the remote execution capability, using the hosted
//!   code-execution tool as an isolated, time-boxed sandbox.

mod error;
mod generator;
mod http;
pub mod messages;
mod sandbox;

pub use error::RemoteError;
pub use generator::AnthropicGenerator;
pub use sandbox::{SandboxClient, classify_response};

use std::time::Duration;

use messages::{FileObject, MessagesRequest, MessagesResponse};
use sleuth_config::AnthropicConfig;

/// Shared Messages API client.
///
/// Cheap to clone; the underlying `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    /// Create a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::NotConfigured`] without an API key, or
    /// [`RemoteError::Http`] if the HTTP client cannot be built.
    pub fn new(config: AnthropicConfig) -> Result<Self, RemoteError> {
        if !config.is_configured() {
            return Err(RemoteError::NotConfigured(
                "anthropic.api_key is empty".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("sleuth/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub const fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    /// Send one Messages request.
    ///
    /// `beta` sets the `anthropic-beta` header; `timeout` bounds the whole
    /// request including the body read.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport failure, non-success status, or
    /// an undecodable body.
    pub async fn create_message(
        &self,
        request: &MessagesRequest<'_>,
        beta: Option<&str>,
        timeout: Duration,
    ) -> Result<MessagesResponse, RemoteError> {
        let mut builder = self
            .authed(self.http.post(self.config.messages_url()), timeout)
            .json(request);
        if let Some(beta) = beta {
            builder = builder.header("anthropic-beta", beta);
        }

        let resp = http::check_response(builder.send().await?).await?;
        decode(resp).await
    }

    /// Upload one file through the Files API.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport failure, non-success status, or
    /// an undecodable body.
    pub async fn upload_file(
        &self,
        filename: &str,
        mime: &str,
        bytes: Vec<u8>,
        beta: &str,
        timeout: Duration,
    ) -> Result<FileObject, RemoteError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let builder = self
            .authed(self.http.post(self.config.files_url()), timeout)
            .header("anthropic-beta", beta)
            .multipart(form);

        let resp = http::check_response(builder.send().await?).await?;
        decode(resp).await
    }

    /// Delete a file previously returned by [`Self::upload_file`].
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport failure or non-success status.
    pub async fn delete_file(
        &self,
        file_id: &str,
        beta: &str,
        timeout: Duration,
    ) -> Result<(), RemoteError> {
        let url = format!("{}/{file_id}", self.config.files_url());
        let builder = self
            .authed(self.http.delete(url), timeout)
            .header("anthropic-beta", beta);
        http::check_response(builder.send().await?).await?;
        Ok(())
    }

    fn authed(&self, builder: reqwest::RequestBuilder, timeout: Duration) -> reqwest::RequestBuilder {
        builder
            .timeout(timeout)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
    }
}

async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, RemoteError> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| RemoteError::Parse(e.to_string()))
}
