//! LlmClient — a configured provider plus the retrieval defaults.

use serde::de::DeserializeOwned;
use structllm_config::{AppConfig, ProviderKind};
use structllm_core::error::{Error, Result};
use structllm_core::message::Conversation;
use structllm_core::provider::{Provider, ProviderRequest};
use structllm_core::schema::{SchemaContract, Typed, Validate};
use structllm_providers::{Backend, build_from_config};
use tracing::debug;

use crate::retrieval::{RetrievalParams, retrieve};

pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// A chat client bound to one provider for its whole lifetime.
pub struct LlmClient<P = Backend> {
    provider: P,
    default_temperature: f32,
    default_attempts: u32,
    max_tokens: Option<u32>,
}

impl LlmClient<Backend> {
    /// Build a client for the provider selected in `config`.
    ///
    /// Fails with a configuration error when the hosted provider is selected
    /// without a credential. No network traffic happens here.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let backend = build_from_config(config)?;
        let max_tokens = match config.provider {
            ProviderKind::Hosted => config.hosted.max_tokens,
            ProviderKind::Local => None,
        };

        Ok(Self::new(backend)
            .with_defaults(config.default_temperature, config.default_attempts)
            .with_max_tokens(max_tokens))
    }
}

impl<P: Provider> LlmClient<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            default_temperature: DEFAULT_TEMPERATURE,
            default_attempts: DEFAULT_ATTEMPTS,
            max_tokens: None,
        }
    }

    pub fn with_defaults(mut self, temperature: f32, attempts: u32) -> Self {
        self.default_temperature = temperature;
        self.default_attempts = attempts;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn default_temperature(&self) -> f32 {
        self.default_temperature
    }

    pub fn default_attempts(&self) -> u32 {
        self.default_attempts
    }

    /// One provider call; returns the reply text unvalidated.
    ///
    /// `None` for either knob falls back to the client defaults.
    pub async fn chat_json(
        &self,
        conversation: &Conversation,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        if conversation.is_empty() {
            return Err(Error::InvalidRequest(
                "conversation must contain at least one message".into(),
            ));
        }

        let request = ProviderRequest::new(
            conversation.clone(),
            temperature.unwrap_or(self.default_temperature),
        )
        .with_max_tokens(max_tokens.or(self.max_tokens));

        debug!(
            provider = self.provider.name(),
            model = self.provider.model(),
            messages = conversation.len(),
            "chat_json"
        );

        Ok(self.provider.complete(request).await?.content)
    }

    /// Retrieve a value satisfying `schema`, retrying with corrective
    /// feedback up to `attempts` times.
    ///
    /// `None` for either knob falls back to the client defaults.
    pub async fn run_structured<S>(
        &self,
        conversation: &Conversation,
        schema: &S,
        temperature: Option<f32>,
        attempts: Option<u32>,
    ) -> Result<S::Output>
    where
        S: SchemaContract + ?Sized,
    {
        let params = RetrievalParams {
            temperature: temperature.unwrap_or(self.default_temperature),
            attempts: attempts.unwrap_or(self.default_attempts),
            max_tokens: self.max_tokens,
        };
        retrieve(&self.provider, conversation, schema, params).await
    }

    /// Shorthand for [`run_structured`](Self::run_structured) with a
    /// [`Typed`] schema and default attempts.
    pub async fn extract<T>(&self, conversation: &Conversation, temperature: Option<f32>) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        self.run_structured(conversation, &Typed::<T>::new(), temperature, None)
            .await
    }
}
