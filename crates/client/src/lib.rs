//! Structured retrieval for structllm.
//!
//! [`LlmClient`] wraps one provider and turns its free-text answers into
//! schema-validated values: the model's reply is parsed as JSON, checked
//! against a [`SchemaContract`](structllm_core::SchemaContract), and on
//! failure the conversation is extended with a corrective instruction and
//! sent again, up to a bounded number of attempts.

pub mod client;
pub mod retrieval;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use client::{DEFAULT_ATTEMPTS, DEFAULT_TEMPERATURE, LlmClient};
pub use retrieval::{AttemptOutcome, RetrievalParams, corrective_message, evaluate, retrieve};
