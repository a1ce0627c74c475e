//! Minimal Anthropic Messages API client: text in, text out, no streaming.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{config::LlmConfig, error::TrendError};

use super::CompletionClient;

const SERVICE: &str = "Anthropic API";

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: [ApiMessage<'a>; 1],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ApiResponse {
    /// Concatenated text blocks, or `None` when there is no text at all.
    fn text(&self) -> Option<String> {
        let text: String = self
            .content
            .iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text.as_deref())
            .collect();

        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: Client,
    api_key: Option<String>,
    api_url: String,
    api_version: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl AnthropicClient {
    pub fn from_config(cfg: &LlmConfig) -> Result<Self, TrendError> {
        let http = Client::builder().timeout(cfg.timeout()).build().map_err(|e| {
            TrendError::Configuration(format!("cannot build Anthropic HTTP client: {e}"))
        })?;

        Ok(Self {
            http,
            api_key: cfg.api_key.clone().filter(|k| !k.trim().is_empty()),
            api_url: cfg.api_url.clone(),
            api_version: cfg.api_version.clone(),
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, prompt: &str) -> Result<String, TrendError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TrendError::Configuration("ANTHROPIC_API_KEY is not provided".into()))?;

        let body = ApiRequest {
            model: &self.model,
            messages: [ApiMessage { role: "user", content: prompt }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(&self.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| TrendError::network(SERVICE, e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| TrendError::network(SERVICE, e))?;

        if !status.is_success() {
            tracing::error!(%status, body = %text, "Anthropic API returned an error");
            return Err(TrendError::upstream(SERVICE, status.as_u16(), &text));
        }

        let parsed: ApiResponse = serde_json::from_str(&text)
            .map_err(|e| TrendError::Malformed { service: SERVICE, message: e.to_string() })?;

        tracing::debug!(response = %text, "model response");
        parsed.text().ok_or(TrendError::EmptyContent)
    }
}
