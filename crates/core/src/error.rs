//! Error types for the structllm domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Transport failures live in [`ProviderError`]; everything a caller of the
//! retrieval loop can observe is folded into [`Error`].

use thiserror::Error;

/// The top-level error type for structured retrieval.
#[derive(Debug, Error)]
pub enum Error {
    // --- Transport errors (never retried) ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Caller errors ---
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // --- Retry budget consumed ---
    #[error("Could not get valid structured output after {attempts} attempts. Last error: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

impl Error {
    /// Build a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 500,
            message: "model not loaded".into(),
        });
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("model not loaded"));
    }

    #[test]
    fn exhausted_error_embeds_attempts_and_cause() {
        let err = Error::Exhausted {
            attempts: 3,
            last_error: "missing field `b`".into(),
        };
        let text = err.to_string();
        assert!(text.contains("after 3 attempts"));
        assert!(text.contains("missing field `b`"));
    }

    #[test]
    fn config_error_names_the_problem() {
        let err = Error::config("OPENAI_API_KEY is missing");
        assert!(err.to_string().starts_with("Configuration error"));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
