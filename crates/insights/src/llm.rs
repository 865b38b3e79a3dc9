use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use propel_core::config::LlmConfig;
use secrecy::ExposeSecret;
use serde::Deserialize;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Client for the Anthropic Messages API.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// Build a client from config. Returns `None` when no API key is
    /// configured, which callers treat as "run the heuristic instead".
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key.as_ref() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Some(Self {
            client,
            api_key: api_key.expose_secret().to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }))
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&serde_json::json!({
                "model": &self.model,
                "max_tokens": self.max_tokens,
                "messages": [{"role": "user", "content": prompt}]
            }))
            .send()
            .await
            .context("request to Anthropic failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Anthropic API error {status}: {body}"));
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            text: Option<String>,
        }
        #[derive(Deserialize)]
        struct MessagesResponse {
            content: Vec<ContentBlock>,
        }

        let parsed: MessagesResponse =
            response.json().await.context("malformed Anthropic response")?;
        parsed
            .content
            .first()
            .and_then(|block| block.text.clone())
            .ok_or_else(|| anyhow!("empty response from Anthropic"))
    }
}
