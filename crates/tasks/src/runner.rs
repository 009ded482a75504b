//! TaskRunner — renders a task prompt and retrieves its structured output.

use std::collections::HashMap;

use serde_json::Value;
use structllm_client::LlmClient;
use structllm_core::message::{Conversation, Message};
use structllm_core::provider::Provider;
use structllm_core::schema::Typed;
use structllm_providers::Backend;
use thiserror::Error;
use tracing::info;

use crate::prompt::{PromptLibrary, TemplateError};
use crate::task::{
    ArticleSummarization, ChatSummarization, Ner, News, Reasoning, Sentiment, Task, TaskKind,
};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Llm(#[from] structllm_core::Error),

    #[error("Failed to encode task output: {0}")]
    Output(#[from] serde_json::Error),
}

pub struct TaskRunner<P = Backend> {
    client: LlmClient<P>,
    prompts: PromptLibrary,
}

impl<P: Provider> TaskRunner<P> {
    pub fn new(client: LlmClient<P>, prompts: PromptLibrary) -> Self {
        Self { client, prompts }
    }

    pub fn client(&self) -> &LlmClient<P> {
        &self.client
    }

    /// The single user message sent for `task` on `input`.
    pub fn build_conversation<T: Task>(
        &self,
        task: &T,
        input: &str,
    ) -> Result<Conversation, TaskError> {
        let values = HashMap::from([(task.variable().to_string(), input.to_string())]);
        let prompt = self.prompts.render(task.template(), &values)?;
        Ok(Conversation::from(vec![Message::user(prompt)]))
    }

    pub async fn run<T: Task>(&self, task: &T, input: &str) -> Result<T::Output, TaskError> {
        let conversation = self.build_conversation(task, input)?;
        let schema = Typed::<T::Output>::named(task.name());

        let output = self
            .client
            .run_structured(&conversation, &schema, Some(task.temperature()), None)
            .await?;

        info!(task = task.name(), "Task completed");
        Ok(output)
    }

    /// Run the task selected by `kind` and return its output as JSON.
    pub async fn run_kind(&self, kind: TaskKind, input: &str) -> Result<Value, TaskError> {
        let value = match kind {
            TaskKind::Sentiment => serde_json::to_value(self.run(&Sentiment, input).await?)?,
            TaskKind::News => {
                serde_json::to_value(self.run(&News { few_shot: false }, input).await?)?
            }
            TaskKind::NewsFewShot => {
                serde_json::to_value(self.run(&News { few_shot: true }, input).await?)?
            }
            TaskKind::Ner => serde_json::to_value(self.run(&Ner, input).await?)?,
            TaskKind::Reasoning => serde_json::to_value(self.run(&Reasoning, input).await?)?,
            TaskKind::ArticleSummary => {
                serde_json::to_value(self.run(&ArticleSummarization, input).await?)?
            }
            TaskKind::ChatSummary => {
                serde_json::to_value(self.run(&ChatSummarization, input).await?)?
            }
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::StubProvider;
    use structllm_core::message::Role;

    fn runner(provider: StubProvider) -> TaskRunner<StubProvider> {
        TaskRunner::new(LlmClient::new(provider), PromptLibrary::embedded())
    }

    #[test]
    fn conversation_is_one_rendered_user_message() {
        let runner = runner(StubProvider::fixed("{}"));
        let conv = runner.build_conversation(&Reasoning, "8x + 7 = -23").unwrap();

        assert_eq!(conv.len(), 1);
        let msg = &conv.messages()[0];
        assert_eq!(msg.role, Role::User);
        assert!(msg.content.contains("8x + 7 = -23"));
        assert!(!msg.content.contains("{{"));
    }

    #[tokio::test]
    async fn run_uses_task_temperature() {
        let runner = runner(StubProvider::fixed(
            r#"{"sentiment":"negative","evidence":"arrived broken"}"#,
        ));

        let result = runner.run(&Sentiment, "It arrived broken.").await.unwrap();
        assert_eq!(result.sentiment, "negative");

        let temps = runner.client().provider().temperatures();
        assert_eq!(temps, vec![0.3]);
    }

    #[tokio::test]
    async fn run_kind_returns_json_value() {
        let runner = runner(StubProvider::fixed(
            r#"{"topic":"technology","confidence":"high","evidence":"open-source model"}"#,
        ));

        let value = runner
            .run_kind(TaskKind::NewsFewShot, "Open-source model outperforms rivals")
            .await
            .unwrap();
        assert_eq!(value["topic"], "technology");

        let prompts = runner.client().provider().prompts();
        let prompt = &prompts[0];
        assert!(prompt.contains("Examples:"));
    }

    #[tokio::test]
    async fn exhausted_retrieval_surfaces_as_llm_error() {
        let runner = runner(StubProvider::fixed("not json"));

        let err = runner.run(&Ner, "Order #AB1234").await.unwrap_err();
        assert!(matches!(
            err,
            TaskError::Llm(structllm_core::Error::Exhausted { attempts: 3, .. })
        ));
        assert_eq!(runner.client().provider().prompts().len(), 3);
    }

    #[tokio::test]
    async fn missing_override_variable_fails_before_any_call() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ner.j2"), "Extract from {{ text }}").unwrap();
        let runner = TaskRunner::new(
            LlmClient::new(StubProvider::fixed("{}")),
            PromptLibrary::embedded().with_override_dir(dir.path()),
        );

        let err = runner.run(&Ner, "hello").await.unwrap_err();
        assert!(matches!(
            err,
            TaskError::Template(TemplateError::MissingVariable { .. })
        ));
        assert!(runner.client().provider().prompts().is_empty());
    }
}
