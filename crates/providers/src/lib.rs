//! LLM transports for structllm.
//!
//! Both transports implement `structllm_core::Provider`. [`Backend`] closes
//! over the two of them and is chosen once, from configuration, by
//! [`build_from_config`].

pub mod backend;
pub mod ollama;
pub mod openai;

pub use backend::{Backend, build_from_config};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
