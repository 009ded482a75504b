//! Shared test utilities for task and batch tests.

use std::sync::Mutex;

use async_trait::async_trait;
use structllm_core::error::ProviderError;
use structllm_core::provider::{Provider, ProviderRequest, ProviderResponse};

type Responder = Box<dyn Fn(&str) -> String + Send + Sync>;

/// A provider that answers from a closure over the first message's content.
pub struct StubProvider {
    respond: Responder,
    prompts: Mutex<Vec<String>>,
    temperatures: Mutex<Vec<f32>>,
}

impl StubProvider {
    pub fn from_fn(respond: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            prompts: Mutex::new(Vec::new()),
            temperatures: Mutex::new(Vec::new()),
        }
    }

    pub fn fixed(reply: &str) -> Self {
        let reply = reply.to_string();
        Self::from_fn(move |_| reply.clone())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn temperatures(&self) -> Vec<f32> {
        self.temperatures.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let prompt = request
            .messages
            .messages()
            .first()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let content = (self.respond)(&prompt);

        self.prompts.lock().unwrap().push(prompt);
        self.temperatures.lock().unwrap().push(request.temperature);

        Ok(ProviderResponse {
            content,
            model: "stub-model".into(),
            usage: None,
        })
    }
}
