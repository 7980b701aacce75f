//! Agent loop — the LLM ↔ tool-calling state machine.
//!
//! Each round makes one model call. A reply without tool calls ends the run; a reply
//! with tool calls is appended, every call is dispatched, one tool message per call is
//! appended in call order, and the next round starts.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use toolchat_core::types::{LlmResponse, ToolCall};
use toolchat_core::{AgentError, ToolError, Transcript};
use toolchat_providers::traits::{LlmProvider, LlmRequestConfig};

use crate::tools::base::ToolArgs;
use crate::tools::registry::ToolRegistry;

/// Default maximum model calls per run.
pub const DEFAULT_MAX_ROUNDS: usize = 20;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

// ─────────────────────────────────────────────
// AgentRun
// ─────────────────────────────────────────────

/// Outcome of a completed run.
#[derive(Debug)]
pub struct AgentRun {
    /// Content of the final assistant message, unchanged.
    pub answer: String,
    /// Number of model calls made.
    pub rounds: usize,
    /// Everything exchanged during the run.
    pub transcript: Transcript,
}

// ─────────────────────────────────────────────
// AgentLoop
// ─────────────────────────────────────────────

pub struct AgentLoop {
    /// Model Client.
    provider: Arc<dyn LlmProvider>,
    /// Read-only for the lifetime of the loop.
    tools: Arc<ToolRegistry>,
    model: String,
    request_config: LlmRequestConfig,
    max_rounds: usize,
    system_prompt: String,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
    ) -> Self {
        let model = model.into();
        info!(
            model = %model,
            provider = provider.display_name(),
            tools = tools.len(),
            "agent loop initialized"
        );
        Self {
            provider,
            tools,
            model,
            request_config: LlmRequestConfig::default(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Cap the number of model calls per run. Zero is treated as one.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn with_request_config(mut self, config: LlmRequestConfig) -> Self {
        self.request_config = config;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// Answer `question`, calling tools as the model requests them.
    pub async fn run(&self, question: &str) -> Result<AgentRun, AgentError> {
        self.run_with_cancel(question, &CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), but stops with [`AgentError::Cancelled`] once `cancel`
    /// fires. The token is checked before each model call and raced against the
    /// pending call; a round's tool dispatch always runs to completion, so the
    /// transcript stays paired.
    pub async fn run_with_cancel(
        &self,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<AgentRun, AgentError> {
        let mut transcript = Transcript::new(self.system_prompt.as_str());
        transcript.push_user(question)?;

        let declarations = self.tools.declarations();
        let tool_defs = (!declarations.is_empty()).then_some(declarations.as_slice());

        let mut rounds = 0;
        loop {
            if cancel.is_cancelled() {
                info!(rounds, "run cancelled at round boundary");
                return Err(AgentError::Cancelled);
            }
            if rounds >= self.max_rounds {
                warn!(rounds, "max rounds reached with tool calls still pending");
                return Err(AgentError::MaxRoundsExceeded { rounds });
            }
            rounds += 1;
            debug!(round = rounds, messages = transcript.len(), "LLM call");

            let response: LlmResponse = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(round = rounds, "run cancelled while awaiting model");
                    return Err(AgentError::Cancelled);
                }
                response = self.provider.chat(
                    transcript.messages(),
                    tool_defs,
                    &self.model,
                    &self.request_config,
                ) => response?,
            };
            response.validate()?;

            if !response.has_tool_calls() {
                let answer = response.content.clone().unwrap_or_default();
                transcript.push_assistant(response.content, Vec::new())?;
                info!(rounds, "final answer received");
                return Ok(AgentRun {
                    answer,
                    rounds,
                    transcript,
                });
            }

            let calls = response.tool_calls.clone();
            transcript.push_assistant(response.content, response.tool_calls)?;

            let results = self.dispatch(&calls, rounds).await;
            for (call, content) in calls.iter().zip(results) {
                transcript.push_tool_result(&call.id, call.name(), content)?;
            }
        }
    }

    /// Run every call of one round concurrently; results come back in call order.
    async fn dispatch(&self, calls: &[ToolCall], round: usize) -> Vec<String> {
        join_all(calls.iter().map(|call| self.execute_call(call, round))).await
    }

    /// Execute one call and render the tool message content. Failures become
    /// `{"error": ...}` content instead of ending the run.
    async fn execute_call(&self, call: &ToolCall, round: usize) -> String {
        match self.try_execute(call, round).await {
            Ok(value) => {
                let content = json!({ "result": value }).to_string();
                debug!(tool = call.name(), result_len = content.len(), "tool result");
                content
            }
            Err(e) => {
                warn!(tool = call.name(), id = %call.id, error = %e, "tool call failed");
                json!({ "error": e.to_string() }).to_string()
            }
        }
    }

    async fn try_execute(&self, call: &ToolCall, round: usize) -> Result<Value, ToolError> {
        let tool = self.tools.resolve(call.name())?;
        let args = parse_arguments(call)?;

        info!(tool = call.name(), id = %call.id, round, "executing tool call");

        // Spawned so a panicking handler is reported like any other failure.
        let name = call.name().to_string();
        tokio::spawn(async move { tool.execute(args).await })
            .await
            .map_err(|e| ToolError::Execution {
                name: name.clone(),
                reason: format!("handler panicked: {e}"),
            })?
            .map_err(|e| ToolError::Execution {
                name,
                reason: format!("{e:#}"),
            })
    }
}

/// Decode raw argument text into an argument map. Blank text means no arguments.
fn parse_arguments(call: &ToolCall) -> Result<ToolArgs, ToolError> {
    let raw = call.raw_arguments().trim();
    if raw.is_empty() {
        return Ok(ToolArgs::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ToolError::ArgumentDecode {
            name: call.name().to_string(),
            reason: format!("expected a JSON object, got {other}"),
        }),
        Err(e) => Err(ToolError::ArgumentDecode {
            name: call.name().to_string(),
            reason: e.to_string(),
        }),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
