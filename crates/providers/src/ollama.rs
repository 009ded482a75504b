//! Local provider: an Ollama server's `/api/chat` endpoint.
//!
//! Requests are non-streaming and carry only the model name and messages.
//! The server is assumed to be running already; nothing here starts, pulls,
//! or health-checks models.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use structllm_core::error::ProviderError;
use structllm_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use tracing::{debug, warn};

pub const DEFAULT_URL: &str = "http://localhost:11434/api/chat";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Local chat transport.
pub struct OllamaProvider {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider for `model` on the default local endpoint.
    pub fn new(model: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_endpoint(DEFAULT_URL, model, DEFAULT_TIMEOUT)
    }

    /// Create a provider for `model` served at `url`, with a request timeout.
    pub fn with_endpoint(
        url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            model: model.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": request.messages,
            "stream": false,
        })
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let body = self.request_body(&request);

        debug!(
            provider = "ollama",
            model = %self.model,
            url = %self.url,
            messages = request.messages.len(),
            "Sending chat request"
        );

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(format!("Ollama did not answer in time: {e}"))
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %error_body, "Ollama returned error");
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: format!("Ollama HTTP {}: {error_body}", status.as_u16()),
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let usage = match (chat.prompt_eval_count, chat.eval_count) {
            (Some(prompt), Some(completion)) => Some(Usage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt.saturating_add(completion),
            }),
            _ => None,
        };

        Ok(ProviderResponse {
            content: chat.message.and_then(|m| m.content).unwrap_or_default(),
            model: chat.model.unwrap_or_else(|| self.model.clone()),
            usage,
        })
    }
}

// --- Ollama API response types ---

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}
