//! Core types for toolchat — the OpenAI chat completions wire format.
//!
//! Messages, tool calls, and tool definitions are modelled as typed Rust values so a
//! malformed request is a compile error rather than a rejected HTTP call.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

// ─────────────────────────────────────────────
// Messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A chat message in the OpenAI format.
///
/// Each variant maps to a `role` field value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },

    #[serde(rename = "assistant")]
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },

    #[serde(rename = "tool")]
    Tool {
        content: String,
        tool_call_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    /// Create an assistant message with text content.
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    /// Create an assistant message carrying tool calls (and optional text).
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Assistant {
            content,
            tool_calls: Some(tool_calls),
        }
    }

    /// Create a tool result message.
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Message::Tool {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
            name: Some(name.into()),
        }
    }

    /// The `role` string this message serializes with.
    pub fn role(&self) -> &'static str {
        match self {
            Message::System { .. } => "system",
            Message::User { .. } => "user",
            Message::Assistant { .. } => "assistant",
            Message::Tool { .. } => "tool",
        }
    }

    /// Text content, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Message::System { content }
            | Message::User { content }
            | Message::Tool { content, .. } => Some(content),
            Message::Assistant { content, .. } => content.as_deref(),
        }
    }

    /// Tool calls carried by an assistant message (empty for every other role).
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::Assistant {
                tool_calls: Some(calls),
                ..
            } => calls,
            _ => &[],
        }
    }
}

// ─────────────────────────────────────────────
// Tool Calls (function calling)
// ─────────────────────────────────────────────

/// A tool call from the assistant, requesting execution of a function.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Identifier unique within the owning assistant message.
    pub id: String,
    /// Always "function" in current OpenAI API.
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    /// The function to call.
    pub function: FunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

impl ToolCall {
    /// Create a new tool call.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        ToolCall {
            id: id.into(),
            call_type: function_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    /// Name of the requested tool.
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Raw argument text, expected (not guaranteed) to be a JSON object.
    pub fn raw_arguments(&self) -> &str {
        &self.function.arguments
    }
}

/// The function name and arguments within a tool call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    /// Name of the function/tool to call.
    pub name: String,
    /// JSON-encoded arguments string.
    #[serde(default)]
    pub arguments: String,
}

// ─────────────────────────────────────────────
// Tool Definitions (for LLM requests)
// ─────────────────────────────────────────────

/// Definition of a tool, sent to the LLM so it knows what tools are available.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// Always "function".
    #[serde(rename = "type")]
    pub tool_type: String,
    /// The function schema.
    pub function: FunctionDefinition,
}

/// Schema of a function tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// How the model may use the declared tools.
///
/// Only sent alongside a non-empty `tools` list. A request without tools omits both
/// fields, which the API treats as `"none"`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// The model decides between answering and calling tools.
    Auto,
}

// ─────────────────────────────────────────────
// LLM Response
// ─────────────────────────────────────────────

/// One assistant turn returned by the Model Client.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LlmResponse {
    /// Text content from the assistant (None if only tool calls).
    pub content: Option<String>,
    /// Tool calls requested by the assistant, in the order the model issued them.
    pub tool_calls: Vec<ToolCall>,
    /// Why the model stopped generating.
    pub finish_reason: Option<String>,
    /// Token usage statistics.
    pub usage: Option<UsageInfo>,
}

impl LlmResponse {
    /// A plain text reply.
    pub fn text(content: impl Into<String>) -> Self {
        LlmResponse {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// A reply requesting tool calls.
    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        LlmResponse {
            tool_calls,
            ..Default::default()
        }
    }

    /// Text content, or `""` when the reply only carries tool calls.
    pub fn text_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Whether the response contains tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Reject malformed replies: no content and no tool calls, or a tool-call id
    /// used twice in the same reply.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.content.is_none() && self.tool_calls.is_empty() {
            return Err(ModelError::Protocol(
                "assistant reply has neither content nor tool calls".into(),
            ));
        }
        let mut seen = HashSet::new();
        for call in &self.tool_calls {
            if !seen.insert(call.id.as_str()) {
                return Err(ModelError::Protocol(format!(
                    "tool call id '{}' appears twice in one reply",
                    call.id
                )));
            }
        }
        Ok(())
    }
}

/// Token usage statistics from the LLM.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ─────────────────────────────────────────────
// Provider wire types
// ─────────────────────────────────────────────

/// Raw chat completion response from an OpenAI-compatible API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<UsageInfo>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl TryFrom<ChatCompletionResponse> for LlmResponse {
    type Error = ModelError;

    fn try_from(resp: ChatCompletionResponse) -> Result<Self, Self::Error> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Protocol("no choices in response".into()))?;

        let response = LlmResponse {
            content: choice.message.content,
            tool_calls: choice.message.tool_calls.unwrap_or_default(),
            finish_reason: choice.finish_reason,
            usage: resp.usage,
        };
        response.validate()?;
        Ok(response)
    }
}

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

// ─────────────────────────────────────────────
// Embeddings
// ─────────────────────────────────────────────

/// Request body for an OpenAI-compatible `/embeddings` API.
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: Vec<String>,
}

/// Raw embeddings response.
#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

/// One embedding vector, tagged with the position of its input.
#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    pub index: usize,
    pub embedding: Vec<f32>,
}

impl EmbeddingResponse {
    /// Vectors in input order. Fails unless there is exactly one vector per input.
    pub fn into_vectors(mut self, expected: usize) -> Result<Vec<Vec<f32>>, ModelError> {
        self.data.sort_by_key(|d| d.index);
        let in_order = self.data.iter().enumerate().all(|(i, d)| d.index == i);
        if self.data.len() != expected || !in_order {
            return Err(ModelError::Protocol(format!(
                "expected {expected} embeddings, got {} (indices not contiguous or wrong count)",
                self.data.len()
            )));
        }
        Ok(self.data.into_iter().map(|d| d.embedding).collect())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_system_message_serialization() {
        let msg = Message::system("You are a helpful assistant, answer any question.");
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "system");
        assert_eq!(
            json["content"],
            "You are a helpful assistant, answer any question."
        );
    }

    #[test]
    fn test_assistant_text_omits_tool_calls() {
        let json = serde_json::to_value(Message::assistant("22")).unwrap();

        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "22");
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn test_assistant_tool_calls_serialization() {
        let msg = Message::assistant_tool_calls(
            None,
            vec![ToolCall::new("call_1", "calculate", r#"{"expression":"2+2*5"}"#)],
        );
        let json = serde_json::to_value(&msg).unwrap();

        assert!(json.get("content").is_none());
        let calls = json["tool_calls"].as_array().unwrap();
        assert_eq!(calls[0]["id"], "call_1");
        assert_eq!(calls[0]["type"], "function");
        assert_eq!(calls[0]["function"]["name"], "calculate");
        assert_eq!(calls[0]["function"]["arguments"], r#"{"expression":"2+2*5"}"#);
    }

    #[test]
    fn test_tool_result_carries_id_and_name() {
        let json = serde_json::to_value(Message::tool_result("call_1", "calculate", "{\"result\":12}"))
            .unwrap();

        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_1");
        assert_eq!(json["name"], "calculate");
        assert_eq!(json["content"], "{\"result\":12}");
    }

    #[test]
    fn test_accessors() {
        let msg = Message::assistant_tool_calls(
            Some("thinking".into()),
            vec![ToolCall::new("a", "calculate", "{}")],
        );
        assert_eq!(msg.role(), "assistant");
        assert_eq!(msg.content(), Some("thinking"));
        assert_eq!(msg.tool_calls().len(), 1);
        assert!(Message::user("hi").tool_calls().is_empty());
    }

    #[test]
    fn test_tool_call_without_type_deserializes() {
        let call: ToolCall = serde_json::from_value(json!({
            "id": "call_9",
            "function": { "name": "calculate", "arguments": "{}" }
        }))
        .unwrap();
        assert_eq!(call.call_type, "function");
        assert_eq!(call.name(), "calculate");
    }

    #[test]
    fn test_tool_choice_serialization() {
        assert_eq!(serde_json::to_value(ToolChoice::Auto).unwrap(), "auto");
    }

    #[test]
    fn test_chat_completion_response_parsing() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-abc123",
            "choices": [{
                "message": { "content": "Hello! How can I help?", "tool_calls": null },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 8, "total_tokens": 18 }
        }))
        .unwrap();
        let llm_resp = LlmResponse::try_from(resp).unwrap();

        assert_eq!(llm_resp.content.as_deref(), Some("Hello! How can I help?"));
        assert!(!llm_resp.has_tool_calls());
        assert_eq!(llm_resp.usage.unwrap().total_tokens, 18);
    }

    #[test]
    fn test_chat_completion_with_tool_calls_parsing() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-xyz",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_42",
                        "type": "function",
                        "function": { "name": "calculate", "arguments": "{\"expression\":\"1+1\"}" }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": null
        }))
        .unwrap();
        let llm_resp = LlmResponse::try_from(resp).unwrap();

        assert!(llm_resp.content.is_none());
        assert_eq!(llm_resp.tool_calls.len(), 1);
        assert_eq!(llm_resp.tool_calls[0].raw_arguments(), "{\"expression\":\"1+1\"}");
    }

    #[test]
    fn test_empty_choices_is_protocol_error() {
        let resp: ChatCompletionResponse =
            serde_json::from_value(json!({ "id": "x", "choices": [], "usage": null })).unwrap();
        let err = LlmResponse::try_from(resp).unwrap_err();
        assert!(matches!(err, ModelError::Protocol(_)));
    }

    #[test]
    fn test_empty_reply_is_protocol_error() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "x",
            "choices": [{ "message": { "content": null }, "finish_reason": "stop" }],
            "usage": null
        }))
        .unwrap();
        assert!(matches!(
            LlmResponse::try_from(resp),
            Err(ModelError::Protocol(_))
        ));
    }

    #[test]
    fn test_chat_request_skips_unset_fields() {
        let request = ChatCompletionRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![Message::user("hi")],
            tools: None,
            tool_choice: None,
            max_tokens: None,
            temperature: Some(0.0),
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["temperature"], 0.0);
        assert!(json.get("tools").is_none());
        assert!(json.get("tool_choice").is_none());
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_duplicate_tool_call_ids_are_protocol_error() {
        let resp = LlmResponse::with_tool_calls(vec![
            ToolCall::new("c1", "calculate", r#"{"expression":"1"}"#),
            ToolCall::new("c1", "calculate", r#"{"expression":"2"}"#),
        ]);
        let err = resp.validate().unwrap_err();
        assert_eq!(
            err,
            ModelError::Protocol("tool call id 'c1' appears twice in one reply".into())
        );

        let distinct = LlmResponse::with_tool_calls(vec![
            ToolCall::new("c1", "calculate", "{}"),
            ToolCall::new("c2", "calculate", "{}"),
        ]);
        assert!(distinct.validate().is_ok());
    }

    #[test]
    fn test_embedding_response_parsing() {
        let resp: EmbeddingResponse = serde_json::from_value(json!({
            "object": "list",
            "data": [
                { "object": "embedding", "index": 1, "embedding": [0.0, 1.0] },
                { "object": "embedding", "index": 0, "embedding": [1.0, 0.0] }
            ],
            "model": "text-embedding-ada-002"
        }))
        .unwrap();
        assert_eq!(resp.into_vectors(2).unwrap(), vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_embedding_response_count_mismatch() {
        let resp: EmbeddingResponse = serde_json::from_value(json!({
            "data": [{ "index": 0, "embedding": [1.0] }]
        }))
        .unwrap();
        assert!(matches!(resp.into_vectors(2), Err(ModelError::Protocol(_))));
    }
}
