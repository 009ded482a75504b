//! Shared test utilities for retrieval tests.

use std::sync::Mutex;

use async_trait::async_trait;
use structllm_core::error::ProviderError;
use structllm_core::provider::{Provider, ProviderRequest, ProviderResponse};

/// A provider that replays a fixed script of replies and records every request.
pub struct ScriptedProvider {
    script: Mutex<Vec<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        let mut script = script;
        script.reverse();
        Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn texts(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn repeating(reply: &str, times: usize) -> Self {
        Self::new((0..times).map(|_| Ok(reply.to_string())).collect())
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop()
            .expect("ScriptedProvider: script exhausted");
        next.map(|content| ProviderResponse {
            content,
            model: "scripted-model".into(),
            usage: None,
        })
    }
}
