//! OpenAI chat-completions adapter
//!
//! Wire peculiarities handled here: tools travel inside a `function`
//! envelope, tool-call arguments arrive as a *serialized JSON string* that
//! must be parsed back into structured form, and call ids are assigned by
//! the backend.

use agentry_application::ports::chat_backend::{
    BackendError, BackendResponse, ChatBackendPort, ChatRequest,
};
use agentry_domain::{ConversationMessage, ToolCall, ToolDefinition};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Connection settings for the OpenAI API.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ChatBackendPort for OpenAiBackend {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: ChatRequest<'_>) -> Result<BackendResponse, BackendError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let mut body = json!({
            "model": request.options.model,
            "max_tokens": request.options.max_tokens,
            "temperature": request.options.temperature,
            "messages": encode_messages(request.messages),
        });
        if !request.tools.is_empty() {
            body["tools"] = Value::Array(encode_tools(request.tools));
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| BackendError::Protocol(e.to_string()))?;
        decode_response(&payload)
    }
}

fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Transport(err.to_string())
    }
}

/// Canonical tools → `{"type": "function", "function": {...}}` envelopes.
/// The schema body passes through untouched.
pub(crate) fn encode_tools(tools: &[ToolDefinition]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.input_schema,
                }
            })
        })
        .collect()
}

pub(crate) fn encode_messages(messages: &[ConversationMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| match message {
            ConversationMessage::User { content } => json!({
                "role": "user",
                "content": content,
            }),
            ConversationMessage::Assistant {
                content,
                tool_calls,
            } => {
                let mut entry = json!({
                    "role": "assistant",
                    "content": content,
                });
                if !tool_calls.is_empty() {
                    // Arguments go back out the way they came in: as a
                    // serialized string.
                    let calls: Vec<Value> = tool_calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": {
                                    "name": call.tool_name,
                                    "arguments": serde_json::to_string(&call.arguments)
                                        .unwrap_or_else(|_| "{}".to_string()),
                                }
                            })
                        })
                        .collect();
                    entry["tool_calls"] = Value::Array(calls);
                }
                entry
            }
            ConversationMessage::Tool {
                tool_call_id,
                content,
                ..
            } => json!({
                "role": "tool",
                "tool_call_id": tool_call_id,
                "content": content,
            }),
        })
        .collect()
}

pub(crate) fn decode_response(payload: &Value) -> Result<BackendResponse, BackendError> {
    let message = payload
        .pointer("/choices/0/message")
        .ok_or_else(|| BackendError::Protocol("response has no choices".to_string()))?;

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let mut tool_calls = Vec::new();
    if let Some(calls) = message.get("tool_calls").and_then(|v| v.as_array()) {
        for call in calls {
            tool_calls.push(decode_tool_call(call)?);
        }
    }

    Ok(BackendResponse {
        content,
        tool_calls,
    })
}

fn decode_tool_call(call: &Value) -> Result<ToolCall, BackendError> {
    let id = call
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| BackendError::Protocol("tool call missing id".to_string()))?;
    let function = call
        .get("function")
        .ok_or_else(|| BackendError::Protocol("tool call missing function".to_string()))?;
    let name = function
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| BackendError::Protocol("tool call missing function name".to_string()))?;

    // Arguments are a JSON string, not an object.
    let raw = function
        .get("arguments")
        .and_then(|v| v.as_str())
        .unwrap_or("{}");
    let arguments: HashMap<String, Value> = serde_json::from_str(raw).map_err(|e| {
        BackendError::Protocol(format!("unparseable tool arguments for '{}': {}", name, e))
    })?;

    Ok(ToolCall {
        id: id.to_string(),
        tool_name: name.to_string(),
        arguments,
    })
}
