//! CLI command implementations.

pub mod batch;
pub mod config_cmd;
pub mod run;

use anyhow::Context;
use structllm_client::LlmClient;
use structllm_config::AppConfig;
use structllm_tasks::{PromptLibrary, TaskRunner};
use tracing::debug;

use crate::GlobalArgs;

/// Load the configuration and apply command-line overrides.
pub fn load_config(global: &GlobalArgs) -> anyhow::Result<AppConfig> {
    let mut config =
        AppConfig::load(global.config.as_deref()).context("Failed to load config")?;
    if let Some(provider) = global.provider {
        config.provider = provider;
    }
    debug!(
        provider = %config.provider,
        model = config.active_model(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Build a task runner for the configured provider.
pub fn build_runner(global: &GlobalArgs) -> anyhow::Result<TaskRunner> {
    let config = load_config(global)?;
    let client = LlmClient::from_config(&config)?;

    let mut prompts = PromptLibrary::embedded();
    if let Some(dir) = &global.templates {
        prompts = prompts.with_override_dir(dir);
    }

    Ok(TaskRunner::new(client, prompts))
}
