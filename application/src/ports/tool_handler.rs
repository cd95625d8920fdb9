//! Tool handler port
//!
//! The executable side of a capability. Handlers receive the trusted
//! [`ExecutionContext`] with every call and must never derive identity from
//! model-supplied arguments.

use agentry_domain::{ExecutionContext, ToolDefinition, ToolError};
use async_trait::async_trait;
use std::collections::HashMap;

/// Interface for executable tool capabilities.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Canonical definition advertised to models.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with validated-by-schema arguments.
    ///
    /// The returned value's `content` (or `message`) field becomes the
    /// primary text folded into conversation history.
    async fn call(
        &self,
        ctx: &ExecutionContext,
        arguments: &HashMap<String, serde_json::Value>,
    ) -> Result<serde_json::Value, ToolError>;
}
