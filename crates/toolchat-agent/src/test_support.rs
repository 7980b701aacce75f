//! Scripted Model Client shared by the agent loop and chat session tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use toolchat_core::types::{LlmResponse, Message, ToolCall, ToolDefinition};
use toolchat_core::ModelError;
use toolchat_providers::{LlmProvider, LlmRequestConfig};

/// What the provider saw on one call.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
    pub model: String,
}

const EMBED_DIMS: usize = 512;

/// A mock LLM provider that replays canned responses in order.
///
/// Embeddings are bag-of-words counts: every distinct lowercase word gets its own
/// dimension, so texts sharing words score higher under cosine similarity.
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<LlmResponse, ModelError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    vocabulary: Mutex<HashMap<String, usize>>,
    embed_calls: Mutex<usize>,
}

impl MockProvider {
    pub fn new(responses: Vec<Result<LlmResponse, ModelError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            vocabulary: Mutex::new(HashMap::new()),
            embed_calls: Mutex::new(0),
        }
    }

    pub fn replies(responses: Vec<LlmResponse>) -> Self {
        Self::new(responses.into_iter().map(Ok).collect())
    }

    pub fn simple(text: &str) -> Self {
        Self::replies(vec![LlmResponse::text(text)])
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn embed_calls(&self) -> usize {
        *self.embed_calls.lock().unwrap()
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vocabulary = self.vocabulary.lock().unwrap();
        let mut vector = vec![0.0; EMBED_DIMS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let next = vocabulary.len();
            let dim = *vocabulary.entry(word.to_lowercase()).or_insert(next);
            vector[dim] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        _config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ModelError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: messages.to_vec(),
            tool_names: tools
                .unwrap_or_default()
                .iter()
                .map(|t| t.function.name.clone())
                .collect(),
            model: model.to_string(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(LlmResponse::text("(no more responses)")))
    }

    async fn embed(&self, inputs: &[String], _model: &str) -> Result<Vec<Vec<f32>>, ModelError> {
        *self.embed_calls.lock().unwrap() += 1;
        Ok(inputs.iter().map(|text| self.embed_text(text)).collect())
    }

    fn display_name(&self) -> &str {
        "MockProvider"
    }
}

/// A tool-call reply from the model.
pub fn tool_reply(calls: &[(&str, &str, &str)]) -> LlmResponse {
    LlmResponse::with_tool_calls(
        calls
            .iter()
            .map(|(id, name, args)| ToolCall::new(*id, *name, *args))
            .collect(),
    )
}

/// Check the pairing invariant: every tool message answers, in order, a call of the
/// nearest preceding assistant message, and each such message is fully answered.
pub fn assert_paired(messages: &[Message]) {
    let mut expected: VecDeque<String> = VecDeque::new();
    for msg in messages {
        match msg {
            Message::Tool { tool_call_id, .. } => {
                assert_eq!(
                    expected.pop_front().as_deref(),
                    Some(tool_call_id.as_str()),
                    "tool result out of order or unmatched"
                );
            }
            other => {
                assert!(expected.is_empty(), "unanswered tool calls before {other:?}");
                expected = other.tool_calls().iter().map(|c| c.id.clone()).collect();
            }
        }
    }
    assert!(expected.is_empty(), "transcript ends with unanswered tool calls");
}
