//! HTTP Model Client for OpenAI-compatible APIs.
//!
//! Talks directly to `{api_base}/chat/completions` via `reqwest`. Works against
//! OpenAI itself and any server that mirrors its wire format.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use toolchat_core::config::schema::ProviderConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;

use toolchat_core::types::{
    ChatCompletionRequest, ChatCompletionResponse, EmbeddingRequest, EmbeddingResponse,
    LlmResponse, Message, ToolChoice, ToolDefinition,
};
use toolchat_core::ModelError;

use crate::traits::{LlmProvider, LlmRequestConfig};

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A Model Client that talks to any OpenAI-compatible HTTP API.
///
/// Built once at process start and shared behind an `Arc<dyn LlmProvider>`.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    /// Extra headers to send with each request.
    extra_headers: HeaderMap,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("headers", &self.extra_headers.len())
            .finish()
    }
}

impl HttpProvider {
    /// Create a provider from the `provider` section of the config.
    pub fn new(config: &ProviderConfig) -> reqwest::Result<Self> {
        let mut extra_headers = HeaderMap::new();
        if let Some(ref headers) = config.extra_headers {
            for (key, value) in headers {
                if let (Ok(name), Ok(val)) = (
                    HeaderName::from_bytes(key.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    extra_headers.insert(name, val);
                } else {
                    warn!("Invalid header: {}={}", key, value);
                }
            }
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(HttpProvider {
            client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            extra_headers,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        self.endpoint("chat/completions")
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/{}", base, path)
    }

    /// POST a JSON body and decode the JSON reply.
    ///
    /// Transport failures and non-2xx statuses are `Unavailable`; an undecodable body
    /// is `Protocol`.
    async fn post_json<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        url: String,
        body: &B,
    ) -> Result<R, ModelError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .headers(self.extra_headers.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                ModelError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!(error = %e, "failed to read response body");
            ModelError::Unavailable(e.to_string())
        })?;

        if !status.is_success() {
            error!(status = %status, body = %text, "API error");
            return Err(ModelError::Unavailable(format!("{status}: {text}")));
        }

        serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "Failed to parse API response");
            ModelError::Protocol(format!("malformed response body: {e}"))
        })
    }

    fn build_request(
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> ChatCompletionRequest {
        let tools = tools.filter(|t| !t.is_empty());
        ChatCompletionRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            tools: tools.map(|t| t.to_vec()),
            tool_choice: tools.map(|_| ToolChoice::Auto),
            max_tokens: Some(config.max_tokens),
            temperature: Some(config.temperature),
        }
    }
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ModelError> {
        debug!(
            model,
            messages = messages.len(),
            tools = tools.map_or(0, |t| t.len()),
            "Calling LLM"
        );

        let request_body = Self::build_request(messages, tools, model, config);
        let chat_resp: ChatCompletionResponse =
            self.post_json(self.completions_url(), &request_body).await?;
        let llm_resp = LlmResponse::try_from(chat_resp)?;

        debug!(
            has_content = llm_resp.content.is_some(),
            tool_calls = llm_resp.tool_calls.len(),
            finish_reason = llm_resp.finish_reason.as_deref().unwrap_or("?"),
            "LLM response received"
        );
        Ok(llm_resp)
    }

    async fn embed(&self, inputs: &[String], model: &str) -> Result<Vec<Vec<f32>>, ModelError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        debug!(model, inputs = inputs.len(), "Calling embeddings");

        let request_body = EmbeddingRequest {
            model: model.to_string(),
            input: inputs.to_vec(),
        };
        let resp: EmbeddingResponse = self
            .post_json(self.endpoint("embeddings"), &request_body)
            .await?;
        resp.into_vectors(inputs.len())
    }

    fn display_name(&self) -> &str {
        "OpenAI-compatible"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
