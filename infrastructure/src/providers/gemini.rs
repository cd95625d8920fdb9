//! Gemini generateContent adapter
//!
//! Wire peculiarities handled here: tools travel inside a
//! `functionDeclarations` envelope with an upper-cased top-level schema
//! `type`, the assistant role is called `model`, and function calls carry
//! no identifier — the translator synthesizes one per call from its
//! position and a timestamp so conversation bookkeeping has a stable id
//! within the turn.

use agentry_application::ports::chat_backend::{
    BackendError, BackendResponse, ChatBackendPort, ChatRequest,
};
use agentry_domain::{ConversationMessage, ToolCall, ToolDefinition};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Connection settings for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ChatBackendPort for GeminiBackend {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: ChatRequest<'_>) -> Result<BackendResponse, BackendError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, request.options.model
        );
        let mut body = json!({
            "contents": encode_messages(request.messages),
            "generationConfig": {
                "maxOutputTokens": request.options.max_tokens,
                "temperature": request.options.temperature,
            },
        });
        if !request.tools.is_empty() {
            body["tools"] = json!([{ "functionDeclarations": encode_tools(request.tools) }]);
        }

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
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

/// Canonical tools → function declarations with the top-level schema
/// `type` upper-cased. Properties and required lists pass through as-is.
pub(crate) fn encode_tools(tools: &[ToolDefinition]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "parameters": declaration_schema(&tool.input_schema),
            })
        })
        .collect()
}

fn declaration_schema(schema: &Value) -> Value {
    let mut schema = schema.clone();
    if let Some(kind) = schema.get("type").and_then(|v| v.as_str()) {
        let upper = kind.to_uppercase();
        schema["type"] = Value::String(upper);
    }
    schema
}

pub(crate) fn encode_messages(messages: &[ConversationMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| match message {
            ConversationMessage::User { content } => json!({
                "role": "user",
                "parts": [{ "text": content }],
            }),
            ConversationMessage::Assistant {
                content,
                tool_calls,
            } => {
                let mut parts = Vec::new();
                if !content.is_empty() {
                    parts.push(json!({ "text": content }));
                }
                for call in tool_calls {
                    parts.push(json!({
                        "functionCall": {
                            "name": call.tool_name,
                            "args": call.arguments,
                        }
                    }));
                }
                json!({ "role": "model", "parts": parts })
            }
            ConversationMessage::Tool {
                tool_name, content, ..
            } => json!({
                "role": "user",
                "parts": [{
                    "functionResponse": {
                        "name": tool_name,
                        "response": { "content": content },
                    }
                }],
            }),
        })
        .collect()
}

pub(crate) fn decode_response(payload: &Value) -> Result<BackendResponse, BackendError> {
    let parts = payload
        .pointer("/candidates/0/content/parts")
        .and_then(|v| v.as_array())
        .ok_or_else(|| BackendError::Protocol("response has no candidate parts".to_string()))?;

    let millis = Utc::now().timestamp_millis();
    let mut content = String::new();
    let mut tool_calls = Vec::new();
    for part in parts {
        if let Some(text) = part.get("text").and_then(|v| v.as_str()) {
            content.push_str(text);
        }
        if let Some(call) = part.get("functionCall") {
            let name = call
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    BackendError::Protocol("functionCall missing name".to_string())
                })?;
            let arguments: HashMap<String, Value> = call
                .get("args")
                .and_then(|v| v.as_object())
                .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default();
            // No backend-assigned id on this wire.
            tool_calls.push(ToolCall {
                id: format!("call_{}_{}", tool_calls.len(), millis),
                tool_name: name.to_string(),
                arguments,
            });
        }
    }

    Ok(BackendResponse {
        content,
        tool_calls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_schema_type_is_uppercased() {
        let tools = vec![ToolDefinition::new("read_file", "Read a file").with_schema(json!({
            "type": "object",
            "properties": { "filename": { "type": "string" } },
            "required": ["filename"],
        }))];

        let encoded = encode_tools(&tools);
        assert_eq!(encoded[0]["parameters"]["type"], "OBJECT");
        // Nested property types are untouched.
        assert_eq!(
            encoded[0]["parameters"]["properties"]["filename"]["type"],
            "string"
        );
        assert_eq!(encoded[0]["parameters"]["required"], json!(["filename"]));
    }

    #[test]
    fn test_decode_synthesizes_distinct_call_ids() {
        let payload = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "functionCall": { "name": "read_file", "args": { "filename": "a.txt" } } },
                        { "functionCall": { "name": "read_file", "args": { "filename": "b.txt" } } }
                    ]
                }
            }]
        });

        let response = decode_response(&payload).unwrap();
        assert_eq!(response.tool_calls.len(), 2);
        assert_ne!(response.tool_calls[0].id, response.tool_calls[1].id);
        assert!(response.tool_calls[0].id.starts_with("call_0_"));
        assert!(response.tool_calls[1].id.starts_with("call_1_"));
        assert_eq!(response.tool_calls[1].get_string("filename"), Some("b.txt"));
    }

    #[test]
    fn test_decode_text_only_is_final_answer() {
        let payload = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "finished" }] }
            }]
        });

        let response = decode_response(&payload).unwrap();
        assert_eq!(response.content, "finished");
        assert!(response.tool_calls.is_empty());
    }

    #[test]
    fn test_assistant_role_maps_to_model() {
        let messages = vec![
            ConversationMessage::User {
                content: "go".to_string(),
            },
            ConversationMessage::Assistant {
                content: "Calling.".to_string(),
                tool_calls: vec![ToolCall::new("call_0_1", "read_file").with_arg("filename", "a")],
            },
            ConversationMessage::Tool {
                tool_call_id: "call_0_1".to_string(),
                tool_name: "read_file".to_string(),
                content: "body".to_string(),
            },
        ];

        let encoded = encode_messages(&messages);
        assert_eq!(encoded[1]["role"], "model");
        assert_eq!(encoded[1]["parts"][1]["functionCall"]["name"], "read_file");
        // Results travel as functionResponse parts keyed by tool name.
        assert_eq!(
            encoded[2]["parts"][0]["functionResponse"]["name"],
            "read_file"
        );
    }
}
