//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical, provider-independent description of a tool.
///
/// This is the single wire contract every provider translator starts from:
///
/// ```json
/// { "name": "...", "description": "...",
///   "input_schema": { "type": "object", "properties": {...}, "required": [...] } }
/// ```
///
/// Identity is `name`; uniqueness is enforced at registration time by the
/// capability registry, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "read_file")
    pub name: String,
    /// Human-readable description shown to the model
    pub description: String,
    /// JSON Schema for the tool's arguments
    #[serde(default = "empty_object_schema")]
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    /// Create a tool definition with an empty object schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: empty_object_schema(),
        }
    }

    /// Replace the input schema (builder pattern).
    pub fn with_schema(mut self, input_schema: serde_json::Value) -> Self {
        self.input_schema = input_schema;
        self
    }

    /// Property names listed as required by the schema.
    pub fn required_parameters(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }
}

/// An empty `{"type": "object"}` schema for parameterless tools.
pub fn empty_object_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {},
        "required": [],
    })
}

/// A normalized tool invocation extracted from a model response.
///
/// Provider translators produce these regardless of the backend wire shape;
/// the task loop and conversation bookkeeping only ever see this form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier, either provider-assigned or synthesized by the
    /// translator. Tool-role messages reference it.
    pub id: String,
    /// Name of the tool to call
    pub tool_name: String,
    /// Structured arguments for the call
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument or return an error message
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        self.get_string(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }

    /// Get an optional i64 argument
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.arguments.get(key).and_then(|v| v.as_i64())
    }

    /// Get an optional bool argument
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.arguments.get(key).and_then(|v| v.as_bool())
    }

    /// The `agent_id` argument the model claims to act as, if present.
    ///
    /// Compared against the trusted [`ExecutionContext`] before dispatch;
    /// a mismatch is an identity-spoofing attempt, not a permission failure.
    ///
    /// [`ExecutionContext`]: crate::context::ExecutionContext
    pub fn claimed_agent_id(&self) -> Option<&str> {
        self.get_string("agent_id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_definition_defaults_to_empty_schema() {
        let tool = ToolDefinition::new("read_file", "Read a file");
        assert_eq!(tool.name, "read_file");
        assert_eq!(tool.input_schema["type"], "object");
        assert!(tool.required_parameters().is_empty());
    }

    #[test]
    fn test_required_parameters() {
        let tool = ToolDefinition::new("write_file", "Write a file").with_schema(json!({
            "type": "object",
            "properties": {
                "filename": {"type": "string"},
                "content": {"type": "string"},
            },
            "required": ["filename", "content"],
        }));

        assert_eq!(tool.required_parameters(), vec!["filename", "content"]);
    }

    #[test]
    fn test_tool_call_arguments() {
        let call = ToolCall::new("call_1", "read_file")
            .with_arg("filename", "notes.txt")
            .with_arg("limit", 10)
            .with_arg("raw", true);

        assert_eq!(call.get_string("filename"), Some("notes.txt"));
        assert_eq!(call.get_i64("limit"), Some(10));
        assert_eq!(call.get_bool("raw"), Some(true));
        assert!(call.require_string("missing").is_err());
    }

    #[test]
    fn test_claimed_agent_id() {
        let call = ToolCall::new("call_1", "list_folders").with_arg("agent_id", "agent-7");
        assert_eq!(call.claimed_agent_id(), Some("agent-7"));

        let call = ToolCall::new("call_2", "list_folders");
        assert_eq!(call.claimed_agent_id(), None);
    }
}
