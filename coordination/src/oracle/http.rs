//! OpenAI-compatible completions backend.
//!
//! Talks to any server exposing `POST {url}/completions` (llama.cpp, vLLM,
//! text-generation-inference in OpenAI mode, or a hosted provider).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GenerationOracle, SamplingParams};
use crate::error::GenerationError;

/// Connection settings for [`HttpOracle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpOracleConfig {
    /// Base URL, e.g. `http://localhost:8080/v1`.
    pub url: String,
    /// Model name sent with each request.
    pub model: String,
    /// Bearer token, if the server wants one.
    pub api_key: Option<String>,
    /// HTTP client timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for HttpOracleConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/v1".to_string(),
            model: "kogpt2-base-v2".to_string(),
            api_key: None,
            request_timeout_secs: 60,
        }
    }
}

/// Generation oracle backed by an HTTP completions endpoint.
pub struct HttpOracle {
    config: HttpOracleConfig,
    client: reqwest::Client,
}

impl HttpOracle {
    pub fn new(config: HttpOracleConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GenerationError::Unavailable(format!("HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/completions", self.config.url.trim_end_matches('/'))
    }

    fn request_body(&self, prompt: &str, params: &SamplingParams) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "max_tokens": params.max_new_tokens,
            "temperature": params.temperature,
            "top_p": params.top_p,
        })
    }
}

/// Pull the generated text out of a completions response.
fn extract_completion_text(body: &serde_json::Value) -> Result<String, GenerationError> {
    body["choices"][0]["text"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| GenerationError::ParseError("missing choices[0].text".to_string()))
}

#[async_trait]
impl GenerationOracle for HttpOracle {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, GenerationError> {
        let start = std::time::Instant::now();

        let mut request = self
            .client
            .post(self.endpoint())
            .json(&self.request_body(prompt, params));
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::RequestFailed(format!(
                "completions API error ({}): {}",
                status, body
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::ParseError(e.to_string()))?;

        let text = extract_completion_text(&body)?;
        debug!(
            model = %self.config.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = text.chars().count(),
            "Completion received"
        );
        Ok(text)
    }
}
