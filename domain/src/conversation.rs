//! Conversation history for the tool-calling loop
//!
//! Messages are a tagged union over the three roles the loop produces.
//! History is append-only and preserves causal request→result pairing:
//! every tool-role message must answer a call id emitted by a preceding
//! assistant message.

use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// A single message in a task conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ConversationMessage {
    /// The task description or a system-level notice injected by the loop.
    User { content: String },
    /// A model turn, optionally requesting tool invocations.
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// The outcome of one tool invocation, answering a prior call id.
    Tool {
        tool_call_id: String,
        tool_name: String,
        content: String,
    },
}

impl ConversationMessage {
    /// Text content of an assistant message, if this is one.
    pub fn assistant_text(&self) -> Option<&str> {
        match self {
            ConversationMessage::Assistant { content, .. } => Some(content),
            _ => None,
        }
    }
}

/// Attempted violation of conversation ordering rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    #[error("tool result references unknown or already-answered call id '{tool_call_id}'")]
    UnmatchedToolResult { tool_call_id: String },
}

/// Append-only conversation history with causal bookkeeping.
///
/// Tracks which assistant-emitted call ids are still awaiting a tool
/// result, so a result can never be appended for a call that was never
/// requested (or answered twice).
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ConversationMessage>,
    pending_calls: HashSet<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the conversation with one user message (the task description).
    pub fn seeded_with(task: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.push_user(task);
        conversation
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ConversationMessage::User {
            content: content.into(),
        });
    }

    /// Append an assistant turn; its tool calls become pending.
    pub fn push_assistant(&mut self, content: impl Into<String>, tool_calls: Vec<ToolCall>) {
        for call in &tool_calls {
            self.pending_calls.insert(call.id.clone());
        }
        self.messages.push(ConversationMessage::Assistant {
            content: content.into(),
            tool_calls,
        });
    }

    /// Append a tool result answering a pending call.
    pub fn push_tool_result(
        &mut self,
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<(), ConversationError> {
        let tool_call_id = tool_call_id.into();
        if !self.pending_calls.remove(&tool_call_id) {
            return Err(ConversationError::UnmatchedToolResult { tool_call_id });
        }
        self.messages.push(ConversationMessage::Tool {
            tool_call_id,
            tool_name: tool_name.into(),
            content: content.into(),
        });
        Ok(())
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Call ids emitted by assistant turns that have no tool result yet.
    pub fn pending_call_ids(&self) -> impl Iterator<Item = &str> {
        self.pending_calls.iter().map(|s| s.as_str())
    }

    /// Text of the most recent assistant message, if any.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find_map(|m| m.assistant_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_conversation_starts_with_task() {
        let conversation = Conversation::seeded_with("Summarize the report");
        assert_eq!(conversation.len(), 1);
        assert!(matches!(
            conversation.messages()[0],
            ConversationMessage::User { .. }
        ));
    }

    #[test]
    fn test_tool_result_must_answer_a_pending_call() {
        let mut conversation = Conversation::seeded_with("task");

        let err = conversation
            .push_tool_result("call_ghost", "read_file", "...")
            .unwrap_err();
        assert_eq!(
            err,
            ConversationError::UnmatchedToolResult {
                tool_call_id: "call_ghost".to_string()
            }
        );
    }

    #[test]
    fn test_causal_pairing() {
        let mut conversation = Conversation::seeded_with("task");
        conversation.push_assistant(
            "Reading the file first.",
            vec![ToolCall::new("call_1", "read_file")],
        );

        assert_eq!(conversation.pending_call_ids().count(), 1);
        conversation
            .push_tool_result("call_1", "read_file", "file body")
            .unwrap();
        assert_eq!(conversation.pending_call_ids().count(), 0);

        // Answering the same call twice is rejected.
        assert!(
            conversation
                .push_tool_result("call_1", "read_file", "again")
                .is_err()
        );
    }

    #[test]
    fn test_last_assistant_text() {
        let mut conversation = Conversation::seeded_with("task");
        assert_eq!(conversation.last_assistant_text(), None);

        conversation.push_assistant("first", vec![]);
        conversation.push_user("notice");
        conversation.push_assistant("final answer", vec![]);
        assert_eq!(conversation.last_assistant_text(), Some("final answer"));
    }
}
