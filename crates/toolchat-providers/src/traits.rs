//! LLM Provider trait — the Model Client boundary.

use async_trait::async_trait;
use toolchat_core::types::{LlmResponse, Message, ToolDefinition};
use toolchat_core::ModelError;

/// Sampling parameters passed to each LLM call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

/// A stateless chat-completion and embeddings client.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one chat completion request.
    ///
    /// # Arguments
    /// * `messages` — the full conversation so far.
    /// * `tools`    — declared tools; `None` or empty means the model must answer directly.
    /// * `model`    — model identifier (e.g. `"gpt-3.5-turbo"`).
    /// * `config`   — temperature, max_tokens.
    ///
    /// # Errors
    /// [`ModelError::Unavailable`] on transport failure or non-success status,
    /// [`ModelError::Protocol`] when the reply cannot be decoded into an assistant turn.
    /// Implementations never retry.
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ModelError>;

    /// Embed each input text, returning one vector per input in input order.
    ///
    /// Providers without an embeddings endpoint keep the default, which reports the
    /// capability as unavailable.
    async fn embed(&self, inputs: &[String], model: &str) -> Result<Vec<Vec<f32>>, ModelError> {
        let _ = (inputs, model);
        Err(ModelError::Unavailable(format!(
            "{} does not support embeddings",
            self.display_name()
        )))
    }

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
