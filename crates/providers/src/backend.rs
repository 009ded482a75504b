//! Backend selection — one transport per [`ProviderKind`], chosen at construction.

use std::time::Duration;

use async_trait::async_trait;
use structllm_config::{AppConfig, ProviderKind};
use structllm_core::error::{Error, ProviderError};
use structllm_core::provider::{Provider, ProviderRequest, ProviderResponse};
use tracing::info;

use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;

/// The configured transport.
pub enum Backend {
    Hosted(OpenAiProvider),
    Local(OllamaProvider),
}

impl Backend {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Hosted(_) => ProviderKind::Hosted,
            Self::Local(_) => ProviderKind::Local,
        }
    }
}

#[async_trait]
impl Provider for Backend {
    fn name(&self) -> &str {
        match self {
            Self::Hosted(p) => p.name(),
            Self::Local(p) => p.name(),
        }
    }

    fn model(&self) -> &str {
        match self {
            Self::Hosted(p) => p.model(),
            Self::Local(p) => p.model(),
        }
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        match self {
            Self::Hosted(p) => p.complete(request).await,
            Self::Local(p) => p.complete(request).await,
        }
    }
}

/// Build the transport named by `config.provider`.
///
/// Selecting the hosted provider without a credential is a configuration
/// error, reported before any client or connection exists.
pub fn build_from_config(config: &AppConfig) -> Result<Backend, Error> {
    let backend = match config.provider {
        ProviderKind::Hosted => {
            let api_key = config.hosted.credential().ok_or_else(|| {
                Error::config(
                    "OPENAI_API_KEY is missing. Set it in your environment or as hosted.api_key in the config file.",
                )
            })?;
            Backend::Hosted(
                OpenAiProvider::new(api_key, &config.hosted.model)?
                    .with_base_url(&config.hosted.api_url),
            )
        }
        ProviderKind::Local => Backend::Local(OllamaProvider::with_endpoint(
            &config.local.url,
            &config.local.model,
            Duration::from_secs(config.local.timeout_secs),
        )?),
    };

    info!(
        provider = %backend.kind(),
        model = %backend.model(),
        "Provider selected"
    );
    Ok(backend)
}
