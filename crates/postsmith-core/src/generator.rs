//! HTTP client for the external content-generation webhook.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};

/// Request body sent to the generation webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub theme: String,
    pub details: String,
    pub platform: String,
}

/// Response body returned by the generation webhook.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub output: String,
}

/// Client for the generation webhook.
#[derive(Debug, Clone)]
pub struct GeneratorClient {
    http: Client,
    endpoint: String,
}

impl GeneratorClient {
    /// Build a client from configuration. The configured timeout bounds the
    /// whole round-trip; there is no retry.
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("postsmith/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Ask the webhook to generate post text for a subject.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let res = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(upstream_error(status.as_u16(), &body));
        }

        let parsed = res
            .json::<GenerationResponse>()
            .await
            .map_err(|e| Error::Upstream(format!("invalid webhook response: {e}")))?;

        Ok(parsed.output)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Upstream("generation webhook timed out".to_string())
    } else {
        Error::Upstream(format!("generation webhook unreachable: {e}"))
    }
}

fn upstream_error(status: u16, body: &str) -> Error {
    let preview: String = body.chars().take(200).collect();
    if preview.is_empty() {
        Error::Upstream(format!("generation webhook returned {status}"))
    } else {
        Error::Upstream(format!("generation webhook returned {status}: {preview}"))
    }
}

#[cfg(test)]
#[path = "generator_tests.rs"]
mod tests;
