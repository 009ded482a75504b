//! # structllm core
//!
//! Domain types, traits, and error definitions shared by every structllm crate.
//! This crate has no HTTP or runtime dependencies: it defines the conversation
//! model, the transport abstraction, and the schema contract that the other
//! crates implement against.

pub mod error;
pub mod message;
pub mod provider;
pub mod schema;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use schema::{BoundedText, FnSchema, SchemaContract, SchemaViolation, Typed, Validate};
