//! Provider trait — the abstraction over LLM transports.
//!
//! A Provider knows how to send a conversation to one model endpoint and
//! return the raw text the model produced. It performs exactly one network
//! call per invocation; retry policy lives one level up in the client.
//!
//! Implementations: hosted OpenAI chat completions, local Ollama chat.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Conversation;

/// A single request to a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The conversation messages, in order
    pub messages: Conversation,

    /// Sampling temperature, passed through without validation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

pub fn default_temperature() -> f32 {
    0.2
}

impl ProviderRequest {
    pub fn new(messages: Conversation, temperature: f32) -> Self {
        Self {
            messages,
            temperature,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The raw text content; empty when the endpoint returned none
    pub content: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics, when the endpoint reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The retrieval loop calls `complete()` without knowing which endpoint is
/// behind it, which also lets tests substitute scripted providers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// The model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Send a request and get the raw text response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;
}
