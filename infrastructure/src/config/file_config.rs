//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the config file. They are
//! deserialized directly and converted into the application-layer config
//! types through the accessor methods at the bottom.

use agentry_application::ports::chat_backend::ChatOptions;
use agentry_application::use_cases::process_task::{DEFAULT_MAX_ITERATIONS, TaskLoopConfig};
use agentry_application::workspace::{DEFAULT_HANDLE_TTL, WorkspaceConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete file configuration (raw TOML structure).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Active backend selection and generation options
    pub backend: FileBackendConfig,
    /// Per-provider connection settings
    pub providers: FileProvidersConfig,
    /// Task loop settings
    pub task: FileTaskConfig,
    /// Workspace storage settings
    pub workspace: FileWorkspaceConfig,
    /// Directory file location
    pub directory: FileDirectoryConfig,
}

impl FileConfig {
    /// Issues a human reviewing the config should see. Empty means clean.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self
            .backend
            .provider
            .parse::<crate::providers::ProviderKind>()
            .is_err()
        {
            issues.push(format!(
                "backend.provider: unknown value '{}', expected openai, anthropic, or gemini",
                self.backend.provider
            ));
        }
        if self.backend.model.is_empty() {
            issues.push("backend.model: no model configured".to_string());
        }
        if self.task.max_iterations == 0 {
            issues.push("task.max_iterations: must be at least 1".to_string());
        }
        if self.workspace.handle_ttl_secs == 0 {
            issues.push("workspace.handle_ttl_secs: must be positive".to_string());
        }
        issues
    }

    pub fn task_loop_config(&self) -> TaskLoopConfig {
        TaskLoopConfig {
            max_iterations: self.task.max_iterations,
            backend_timeout: Duration::from_secs(self.task.backend_timeout_secs),
            options: ChatOptions {
                model: self.backend.model.clone(),
                max_tokens: self.backend.max_tokens,
                temperature: self.backend.temperature,
            },
        }
    }

    pub fn workspace_config(&self) -> WorkspaceConfig {
        WorkspaceConfig {
            handle_ttl: Duration::from_secs(self.workspace.handle_ttl_secs),
            sweep_interval: Duration::from_secs(self.workspace.sweep_interval_secs),
        }
    }
}

/// `[backend]` — which provider runs tasks and with what options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Provider name: "openai", "anthropic", or "gemini"
    pub provider: String,
    /// Model identifier passed through to the provider
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
            temperature: 0.2,
        }
    }
}

/// `[providers]` — connection settings per provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    pub openai: FileOpenAiConfig,
    pub anthropic: FileAnthropicConfig,
    pub gemini: FileGeminiConfig,
}

/// OpenAI API provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended — use env var instead).
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Anthropic API provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnthropicConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended — use env var instead).
    pub api_key: Option<String>,
    pub base_url: String,
    /// Anthropic API version header.
    pub api_version: String,
}

impl Default for FileAnthropicConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            api_version: "2023-06-01".to_string(),
        }
    }
}

/// Gemini API provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeminiConfig {
    /// Environment variable name for the API key (default: "GEMINI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended — use env var instead).
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for FileGeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

/// `[task]` — loop policy constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTaskConfig {
    pub max_iterations: usize,
    pub backend_timeout_secs: u64,
}

impl Default for FileTaskConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            backend_timeout_secs: 120,
        }
    }
}

/// `[workspace]` — storage root and handle lifetimes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkspaceConfig {
    /// Root directory for workspace storage
    pub root: String,
    pub handle_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for FileWorkspaceConfig {
    fn default() -> Self {
        Self {
            root: "./workspace".to_string(),
            handle_ttl_secs: DEFAULT_HANDLE_TTL.as_secs(),
            sweep_interval_secs: 60,
        }
    }
}

/// `[directory]` — where the organization/team/agent records live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDirectoryConfig {
    pub path: String,
}

impl Default for FileDirectoryConfig {
    fn default() -> Self {
        Self {
            path: "./directory.toml".to_string(),
        }
    }
}
