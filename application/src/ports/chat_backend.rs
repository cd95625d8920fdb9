//! Chat backend port
//!
//! The sole interface the task loop depends on for LLM access. Provider
//! adapters translate the canonical request into their native wire format
//! and normalize responses back; raw backend shapes never leak past them.

use agentry_domain::{ConversationMessage, ToolCall, ToolDefinition};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur on a single backend call.
///
/// All variants are recoverable at the per-call level: the loop folds them
/// into conversation history instead of aborting the task.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend call timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned an unexpected response shape: {0}")]
    Protocol(String),

    #[error("backend rejected the request (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Generation options for one backend call.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: 4096,
            temperature: 0.2,
        }
    }
}

/// One canonical chat request: the conversation so far plus the agent's
/// resolved tool set.
#[derive(Debug, Clone)]
pub struct ChatRequest<'a> {
    pub messages: &'a [ConversationMessage],
    pub tools: &'a [ToolDefinition],
    pub options: &'a ChatOptions,
}

/// Normalized backend response.
///
/// An empty `tool_calls` list means a final textual answer — adapters must
/// never treat it as an error.
#[derive(Debug, Clone, Default)]
pub struct BackendResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl BackendResponse {
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_call(mut self, call: ToolCall) -> Self {
        self.tool_calls.push(call);
        self
    }
}

/// Port for LLM chat completion.
#[async_trait]
pub trait ChatBackendPort: Send + Sync + std::fmt::Debug {
    /// Human-readable provider name for logging (e.g. "anthropic").
    fn provider_name(&self) -> &str;

    /// Run one completion over the conversation with the given tool set.
    async fn complete(&self, request: ChatRequest<'_>) -> Result<BackendResponse, BackendError>;
}
