//! The structured retrieval loop.
//!
//! ```text
//! Pending ─► ParseError | ValidationError ─► Pending (attempts remain)
//!        └─► Success                      └─► Exhausted
//! ```
//!
//! The caller's conversation is never modified. Attempt `k` sends the
//! original messages followed by the `k - 1` corrective system messages
//! accumulated so far; rejected model replies are not echoed back.
//!
//! Only content failures are retried. Transport errors end the call at once.

use serde_json::Value;
use structllm_core::error::{Error, Result};
use structllm_core::message::{Conversation, Message};
use structllm_core::provider::{Provider, ProviderRequest};
use structllm_core::schema::SchemaContract;
use tracing::{debug, info, warn};

/// Per-call knobs for [`retrieve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalParams {
    pub temperature: f32,
    pub attempts: u32,
    pub max_tokens: Option<u32>,
}

/// Result of judging one raw model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome<T> {
    ParsedAndValid(T),
    ParseError(String),
    ValidationError(String),
}

impl<T> AttemptOutcome<T> {
    /// Human-readable failure description, `None` on success.
    pub fn failure(&self) -> Option<String> {
        match self {
            Self::ParsedAndValid(_) => None,
            Self::ParseError(cause) => Some(format!("invalid JSON: {cause}")),
            Self::ValidationError(cause) => Some(format!("schema validation failed: {cause}")),
        }
    }
}

/// Parse `raw` as a single JSON value and validate it against `schema`.
pub fn evaluate<S>(raw: &str, schema: &S) -> AttemptOutcome<S::Output>
where
    S: SchemaContract + ?Sized,
{
    if raw.trim().is_empty() {
        return AttemptOutcome::ParseError("the response was empty".into());
    }

    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => return AttemptOutcome::ParseError(e.to_string()),
    };

    if !value.is_object() && !schema.accepts_non_object() {
        return AttemptOutcome::ParseError(format!(
            "expected a single JSON object, got {}",
            json_kind(&value)
        ));
    }

    match schema.validate(value) {
        Ok(output) => AttemptOutcome::ParsedAndValid(output),
        Err(violation) => AttemptOutcome::ValidationError(violation.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The system message appended after a rejected attempt.
pub fn corrective_message(failure: &str) -> Message {
    Message::system(format!(
        "Your last output was invalid. Error: {failure}. \
         Return ONLY valid JSON exactly matching the schema."
    ))
}

/// Run the retrieval loop against `provider`.
///
/// Makes at most `params.attempts` provider calls and returns the first
/// reply that parses and validates. Fails with [`Error::Exhausted`] once the
/// budget is spent, or immediately with [`Error::Provider`] if the transport
/// fails.
pub async fn retrieve<P, S>(
    provider: &P,
    conversation: &Conversation,
    schema: &S,
    params: RetrievalParams,
) -> Result<S::Output>
where
    P: Provider + ?Sized,
    S: SchemaContract + ?Sized,
{
    if conversation.is_empty() {
        return Err(Error::InvalidRequest(
            "conversation must contain at least one message".into(),
        ));
    }
    if params.attempts == 0 {
        return Err(Error::InvalidRequest(
            "attempt budget must be at least 1".into(),
        ));
    }

    let mut corrections: Vec<Message> = Vec::new();
    let mut last_failure = String::new();

    for attempt in 1..=params.attempts {
        let request = ProviderRequest::new(conversation.extended_with(&corrections), params.temperature)
            .with_max_tokens(params.max_tokens);

        let response = provider.complete(request).await?;
        debug!(
            attempt,
            schema = schema.name(),
            model = %response.model,
            usage = ?response.usage,
            raw = %response.content,
            "Raw response"
        );

        let failure = match evaluate(&response.content, schema) {
            AttemptOutcome::ParsedAndValid(output) => {
                info!(
                    attempt,
                    provider = provider.name(),
                    schema = schema.name(),
                    "Structured output accepted"
                );
                return Ok(output);
            }
            rejected => rejected.failure().unwrap_or_default(),
        };

        warn!(
            attempt,
            attempts = params.attempts,
            schema = schema.name(),
            error = %failure,
            "Structured output rejected"
        );

        if attempt < params.attempts {
            corrections.push(corrective_message(&failure));
        }
        last_failure = failure;
    }

    Err(Error::Exhausted {
        attempts: params.attempts,
        last_error: last_failure,
    })
}
