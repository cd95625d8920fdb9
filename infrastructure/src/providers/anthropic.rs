//! Anthropic messages adapter
//!
//! Wire peculiarities handled here: the schema travels under `input_schema`
//! (no envelope), tool arguments arrive pre-parsed as an object in
//! `tool_use` content blocks, and tool results go back as `tool_result`
//! blocks inside a user-role message.

use agentry_application::ports::chat_backend::{
    BackendError, BackendResponse, ChatBackendPort, ChatRequest,
};
use agentry_domain::{ConversationMessage, ToolCall, ToolDefinition};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::collections::HashMap;

const API_VERSION: &str = "2023-06-01";

/// Connection settings for the Anthropic API.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub api_version: String,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.anthropic.com".to_string(),
            api_version: API_VERSION.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct AnthropicBackend {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicBackend {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ChatBackendPort for AnthropicBackend {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: ChatRequest<'_>) -> Result<BackendResponse, BackendError> {
        let url = format!("{}/v1/messages", self.config.base_url);
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
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
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

/// Canonical tools → flat objects with the schema under `input_schema`.
pub(crate) fn encode_tools(tools: &[ToolDefinition]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "input_schema": tool.input_schema,
            })
        })
        .collect()
}

/// Canonical history → Anthropic content-block messages.
///
/// Tool results have no role of their own on this wire: they ride as
/// `tool_result` blocks in a user-role message immediately after the
/// assistant turn that requested them.
pub(crate) fn encode_messages(messages: &[ConversationMessage]) -> Vec<Value> {
    let mut encoded = Vec::with_capacity(messages.len());
    for message in messages {
        match message {
            ConversationMessage::User { content } => {
                encoded.push(json!({ "role": "user", "content": content }));
            }
            ConversationMessage::Assistant {
                content,
                tool_calls,
            } => {
                let mut blocks = Vec::new();
                if !content.is_empty() {
                    blocks.push(json!({ "type": "text", "text": content }));
                }
                for call in tool_calls {
                    blocks.push(json!({
                        "type": "tool_use",
                        "id": call.id,
                        "name": call.tool_name,
                        "input": call.arguments,
                    }));
                }
                encoded.push(json!({ "role": "assistant", "content": blocks }));
            }
            ConversationMessage::Tool {
                tool_call_id,
                content,
                ..
            } => {
                let block = json!({
                    "type": "tool_result",
                    "tool_use_id": tool_call_id,
                    "content": content,
                });
                // Consecutive tool results fold into one user message.
                match encoded.last_mut() {
                    Some(last)
                        if last["role"] == "user"
                            && last["content"]
                                .as_array()
                                .is_some_and(|blocks| {
                                    blocks.iter().all(|b| b["type"] == "tool_result")
                                }) =>
                    {
                        last["content"].as_array_mut().unwrap().push(block);
                    }
                    _ => {
                        encoded.push(json!({ "role": "user", "content": [block] }));
                    }
                }
            }
        }
    }
    encoded
}

pub(crate) fn decode_response(payload: &Value) -> Result<BackendResponse, BackendError> {
    let blocks = payload
        .get("content")
        .and_then(|v| v.as_array())
        .ok_or_else(|| BackendError::Protocol("response has no content blocks".to_string()))?;

    let mut content = String::new();
    let mut tool_calls = Vec::new();
    for block in blocks {
        match block.get("type").and_then(|v| v.as_str()) {
            Some("text") => {
                if let Some(text) = block.get("text").and_then(|v| v.as_str()) {
                    content.push_str(text);
                }
            }
            Some("tool_use") => {
                let id = block
                    .get("id")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| BackendError::Protocol("tool_use missing id".to_string()))?;
                let name = block
                    .get("name")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| BackendError::Protocol("tool_use missing name".to_string()))?;
                // Input is already structured on this wire.
                let arguments: HashMap<String, Value> = block
                    .get("input")
                    .and_then(|v| v.as_object())
                    .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                    .unwrap_or_default();
                tool_calls.push(ToolCall {
                    id: id.to_string(),
                    tool_name: name.to_string(),
                    arguments,
                });
            }
            _ => {}
        }
    }

    Ok(BackendResponse {
        content,
        tool_calls,
    })
}
