//! Infrastructure layer for agentry
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the three provider backends, storage and directory
//! adapters, the built-in tool handlers, and configuration file loading.

pub mod config;
pub mod directory;
pub mod providers;
pub mod storage;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, FileConfig, build_backend};
pub use directory::{DirectoryFile, DirectoryLoadError, InMemoryDirectory};
pub use providers::{
    AnthropicBackend, AnthropicConfig, GeminiBackend, GeminiConfig, OpenAiBackend, OpenAiConfig,
    ProviderKind,
};
pub use storage::{LocalStorage, MemoryStorage};
pub use tools::register_builtin_tools;
