//! Configuration loading, validation, and management for structllm.
//!
//! Loads configuration from `~/.structllm/config.toml` (or the file named by
//! `STRUCTLLM_CONFIG`) with environment variable overrides. The resulting
//! [`AppConfig`] is an explicit value handed to client constructors; nothing
//! downstream reads the process environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Selects the provider backend.
pub const ENV_PROVIDER: &str = "PROVIDER";
/// Overrides the hosted model identifier.
pub const ENV_HOSTED_MODEL: &str = "OPENAI_MODEL";
/// Overrides the local model identifier.
pub const ENV_LOCAL_MODEL: &str = "OLLAMA_MODEL";
/// Hosted provider credential.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Path of the config file.
pub const ENV_CONFIG_PATH: &str = "STRUCTLLM_CONFIG";

/// Which backend serves requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Remote chat-completion API; requires a credential
    #[default]
    #[serde(alias = "openai")]
    Hosted,
    /// Model server on the local interface
    #[serde(alias = "ollama")]
    Local,
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hosted" | "openai" => Ok(Self::Hosted),
            "local" | "ollama" => Ok(Self::Local),
            other => Err(ConfigError::ValidationError(format!(
                "unknown provider '{other}' (expected 'hosted' or 'local')"
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hosted => f.write_str("hosted"),
            Self::Local => f.write_str("local"),
        }
    }
}

/// The root configuration structure.
///
/// Maps directly to `~/.structllm/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Active provider
    #[serde(default)]
    pub provider: ProviderKind,

    /// Temperature used when a caller does not pick one
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Attempt budget for structured retrieval
    #[serde(default = "default_attempts")]
    pub default_attempts: u32,

    /// Hosted provider settings
    #[serde(default)]
    pub hosted: HostedConfig,

    /// Local provider settings
    #[serde(default)]
    pub local: LocalConfig,
}

fn default_temperature() -> f32 {
    0.2
}
fn default_attempts() -> u32 {
    3
}

#[derive(Clone, Serialize, Deserialize)]
pub struct HostedConfig {
    #[serde(default = "default_hosted_model")]
    pub model: String,

    #[serde(default = "default_hosted_url")]
    pub api_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Cap on generated tokens; unset leaves it to the endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_hosted_model() -> String {
    "gpt-4o-mini".into()
}
fn default_hosted_url() -> String {
    "https://api.openai.com/v1".into()
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            model: default_hosted_model(),
            api_url: default_hosted_url(),
            api_key: None,
            max_tokens: None,
        }
    }
}

impl HostedConfig {
    /// The credential, if one is set and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

impl fmt::Debug for HostedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedConfig")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default = "default_local_model")]
    pub model: String,

    #[serde(default = "default_local_url")]
    pub url: String,

    #[serde(default = "default_local_timeout")]
    pub timeout_secs: u64,
}

fn default_local_model() -> String {
    "gemma:2b".into()
}
fn default_local_url() -> String {
    "http://localhost:11434/api/chat".into()
}
fn default_local_timeout() -> u64 {
    60
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            model: default_local_model(),
            url: default_local_url(),
            timeout_secs: default_local_timeout(),
        }
    }
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl AppConfig {
    /// Load configuration from `path`, `$STRUCTLLM_CONFIG`, or the default
    /// location, then apply environment overrides:
    /// - `PROVIDER` (`hosted`/`openai` or `local`/`ollama`)
    /// - `OPENAI_MODEL`, `OLLAMA_MODEL`
    /// - `OPENAI_API_KEY` (only when the file sets no key)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(|| {
            std::env::var(ENV_CONFIG_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|_| Self::config_dir().join("config.toml"))
        });

        let mut config = Self::load_from(&path)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment-like lookup. Blank values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(provider) = var(ENV_PROVIDER) {
            self.provider = provider.parse()?;
        }
        if let Some(model) = var(ENV_HOSTED_MODEL) {
            self.hosted.model = model;
        }
        if let Some(model) = var(ENV_LOCAL_MODEL) {
            self.local.model = model;
        }
        if self.hosted.credential().is_none() {
            self.hosted.api_key = var(ENV_API_KEY);
        }

        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".structllm")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.default_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "default_attempts must be at least 1".into(),
            ));
        }

        if self.local.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "local.timeout_secs must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if a hosted credential is available.
    pub fn has_api_key(&self) -> bool {
        self.hosted.credential().is_some()
    }

    /// Model identifier of the active provider.
    pub fn active_model(&self) -> &str {
        match self.provider {
            ProviderKind::Hosted => &self.hosted.model,
            ProviderKind::Local => &self.local.model,
        }
    }

    /// A copy safe to print: the credential is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.hosted.api_key = self.hosted.api_key.as_ref().map(|_| "[REDACTED]".to_string());
        copy
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            default_temperature: default_temperature(),
            default_attempts: default_attempts(),
            hosted: HostedConfig::default(),
            local: LocalConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.provider, ProviderKind::Hosted);
        assert_eq!(config.hosted.model, "gpt-4o-mini");
        assert_eq!(config.local.model, "gemma:2b");
        assert_eq!(config.local.url, "http://localhost:11434/api/chat");
        assert_eq!(config.local.timeout_secs, 60);
        assert_eq!(config.default_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider, config.provider);
        assert_eq!(parsed.local.url, config.local.url);
    }

    #[test]
    fn provider_aliases_parse() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::Hosted);
        assert_eq!("Ollama".parse::<ProviderKind>().unwrap(), ProviderKind::Local);
        assert_eq!(" local ".parse::<ProviderKind>().unwrap(), ProviderKind::Local);
        assert!("anthropic".parse::<ProviderKind>().is_err());

        let config: AppConfig = toml::from_str(r#"provider = "ollama""#).unwrap();
        assert_eq!(config.provider, ProviderKind::Local);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_attempts_rejected() {
        let config = AppConfig {
            default_attempts: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.provider, ProviderKind::Hosted);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
provider = "local"
default_temperature = 0.5

[local]
model = "llama3"
timeout_secs = 10
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.provider, ProviderKind::Local);
        assert_eq!(config.local.model, "llama3");
        assert_eq!(config.local.timeout_secs, 10);
        assert_eq!(config.local.url, "http://localhost:11434/api/chat");
        assert_eq!(config.active_model(), "llama3");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "provider = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("PROVIDER", "ollama"),
                ("OPENAI_MODEL", "gpt-4o"),
                ("OLLAMA_MODEL", "mistral"),
                ("OPENAI_API_KEY", "sk-test"),
            ]))
            .unwrap();

        assert_eq!(config.provider, ProviderKind::Local);
        assert_eq!(config.hosted.model, "gpt-4o");
        assert_eq!(config.local.model, "mistral");
        assert_eq!(config.hosted.credential(), Some("sk-test"));
    }

    #[test]
    fn file_credential_wins_over_env() {
        let mut config = AppConfig::default();
        config.hosted.api_key = Some("sk-file".into());
        config.apply_env(env(&[("OPENAI_API_KEY", "sk-env")])).unwrap();
        assert_eq!(config.hosted.credential(), Some("sk-file"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[("PROVIDER", ""), ("OPENAI_API_KEY", "  ")]))
            .unwrap();
        assert_eq!(config.provider, ProviderKind::Hosted);
        assert!(!config.has_api_key());
    }

    #[test]
    fn unknown_provider_in_env_rejected() {
        let mut config = AppConfig::default();
        let err = config.apply_env(env(&[("PROVIDER", "bard")])).unwrap_err();
        assert!(err.to_string().contains("bard"));
    }

    #[test]
    fn debug_output_redacts_credential() {
        let mut config = AppConfig::default();
        config.hosted.api_key = Some("sk-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn redacted_copy_masks_credential_only() {
        let mut config = AppConfig::default();
        config.hosted.api_key = Some("sk-secret".into());
        let shown = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("[REDACTED]"));
        assert!(shown.contains("gpt-4o-mini"));
        assert_eq!(config.hosted.api_key.as_deref(), Some("sk-secret"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("hosted"));
        assert!(toml_str.contains("gemma:2b"));
    }
}
