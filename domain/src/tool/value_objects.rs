//! Tool domain value objects — execution error codes and output rendering
//!
//! Error codes classify executor failures for the conversation loop:
//! every code except `SECURITY_VIOLATION` is recoverable and is folded back
//! into conversation history so the model can adapt its next turn.

use serde::{Deserialize, Serialize};

/// Error that occurred during tool execution.
///
/// | Code | Recoverable? | Description |
/// |------|-----------|-------------|
/// | `INVALID_ARGUMENT` | Yes | Missing/wrong parameters — the model can fix |
/// | `NOT_FOUND` | Yes | Unknown tool or resource — the model can correct |
/// | `HANDLE_EXPIRED` | Yes | Stale folder handle — re-discover folders |
/// | `PERMISSION_DENIED` | Yes | Blocked by scope or blacklist rules |
/// | `EXECUTION_FAILED` | Yes | Runtime failure (I/O error, HTTP error) |
/// | `TIMEOUT` | Yes | Operation timed out |
/// | `SECURITY_VIOLATION` | No | Identity spoofing — fails closed, logged distinctly |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "HANDLE_EXPIRED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common error constructors
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            "NOT_FOUND",
            format!("Resource not found: {}", resource.into()),
        )
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new("PERMISSION_DENIED", message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }

    pub fn handle_expired() -> Self {
        Self::new(
            "HANDLE_EXPIRED",
            "Folder handle has expired or is unknown. Call list_folders again to obtain a fresh handle.",
        )
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            "TIMEOUT",
            format!("Operation timed out: {}", operation.into()),
        )
    }

    pub fn security_violation(message: impl Into<String>) -> Self {
        Self::new("SECURITY_VIOLATION", message)
    }

    /// Whether the loop may surface this error to the model and continue.
    pub fn is_recoverable(&self) -> bool {
        self.code != "SECURITY_VIOLATION"
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Extract the primary textual content from an executor result.
///
/// Preference order: a string `content` field, then a string `message`
/// field, then a plain string value, otherwise a compact JSON dump of the
/// whole result. No summarization or truncation is applied.
pub fn render_primary_content(value: &serde_json::Value) -> String {
    if let Some(content) = value.get("content").and_then(|v| v.as_str()) {
        return content.to_string();
    }
    if let Some(message) = value.get("message").and_then(|v| v.as_str()) {
        return message.to_string();
    }
    if let Some(text) = value.as_str() {
        return text.to_string();
    }
    value.to_string()
}
