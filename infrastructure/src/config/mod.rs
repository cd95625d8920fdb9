//! Configuration loading and backend wiring

mod file_config;
mod loader;

pub use file_config::{
    FileAnthropicConfig, FileBackendConfig, FileConfig, FileDirectoryConfig, FileGeminiConfig,
    FileOpenAiConfig, FileProvidersConfig, FileTaskConfig, FileWorkspaceConfig,
};
pub use loader::ConfigLoader;

use crate::providers::{
    AnthropicBackend, AnthropicConfig, GeminiBackend, GeminiConfig, OpenAiBackend, OpenAiConfig,
    ProviderKind,
};
use agentry_application::ports::chat_backend::ChatBackendPort;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("no API key for {provider}: set {env_var} or providers.{provider}.api_key")]
    MissingApiKey {
        provider: &'static str,
        env_var: String,
    },
}

/// Resolve an API key: explicit config value first, then the named
/// environment variable.
fn resolve_api_key(
    provider: &'static str,
    api_key: Option<&str>,
    env_var: &str,
) -> Result<String, ConfigError> {
    if let Some(key) = api_key {
        return Ok(key.to_string());
    }
    std::env::var(env_var).map_err(|_| ConfigError::MissingApiKey {
        provider,
        env_var: env_var.to_string(),
    })
}

/// Construct the chat backend the config selects.
pub fn build_backend(config: &FileConfig) -> Result<Arc<dyn ChatBackendPort>, ConfigError> {
    let kind: ProviderKind = config
        .backend
        .provider
        .parse()
        .map_err(ConfigError::UnknownProvider)?;

    match kind {
        ProviderKind::OpenAi => {
            let settings = &config.providers.openai;
            let api_key = resolve_api_key(
                "openai",
                settings.api_key.as_deref(),
                &settings.api_key_env,
            )?;
            Ok(Arc::new(OpenAiBackend::new(OpenAiConfig {
                api_key,
                base_url: settings.base_url.clone(),
            })))
        }
        ProviderKind::Anthropic => {
            let settings = &config.providers.anthropic;
            let api_key = resolve_api_key(
                "anthropic",
                settings.api_key.as_deref(),
                &settings.api_key_env,
            )?;
            Ok(Arc::new(AnthropicBackend::new(AnthropicConfig {
                api_key,
                base_url: settings.base_url.clone(),
                api_version: settings.api_version.clone(),
            })))
        }
        ProviderKind::Gemini => {
            let settings = &config.providers.gemini;
            let api_key = resolve_api_key(
                "gemini",
                settings.api_key.as_deref(),
                &settings.api_key_env,
            )?;
            Ok(Arc::new(GeminiBackend::new(GeminiConfig {
                api_key,
                base_url: settings.base_url.clone(),
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_api_key_wins_over_env() {
        let mut config = FileConfig::default();
        config.backend.provider = "openai".to_string();
        config.providers.openai.api_key = Some("sk-test".to_string());

        let backend = build_backend(&config).unwrap();
        assert_eq!(backend.provider_name(), "openai");
    }

    #[test]
    fn test_missing_api_key_names_the_env_var() {
        let mut config = FileConfig::default();
        config.backend.provider = "gemini".to_string();
        config.providers.gemini.api_key_env = "AGENTRY_TEST_SURELY_UNSET_KEY".to_string();

        let err = build_backend(&config).unwrap_err();
        assert!(err.to_string().contains("AGENTRY_TEST_SURELY_UNSET_KEY"));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let mut config = FileConfig::default();
        config.backend.provider = "mistral".to_string();
        assert!(matches!(
            build_backend(&config),
            Err(ConfigError::UnknownProvider(_))
        ));
    }
}
