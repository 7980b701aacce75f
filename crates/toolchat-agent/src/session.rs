//! Conversation session — plain multi-turn chat without tool dispatch.

use std::sync::Arc;

use tracing::{debug, info};

use toolchat_core::types::Message;
use toolchat_core::{AgentError, ModelError, Transcript};
use toolchat_providers::traits::{LlmProvider, LlmRequestConfig};

const EXIT_COMMAND: &str = "exit";

/// Source of user input lines.
///
/// `None` means the input is exhausted (EOF or interrupt) and ends the session.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

impl<I: Iterator<Item = String>> LineSource for I {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        self.next()
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEnd {
    /// Number of completed user/assistant exchanges.
    pub turns: usize,
}

pub struct ChatSession {
    provider: Arc<dyn LlmProvider>,
    model: String,
    request_config: LlmRequestConfig,
    transcript: Transcript,
}

impl ChatSession {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        request_config: LlmRequestConfig,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            request_config,
            transcript: Transcript::new(system_prompt),
        }
    }

    /// `exit`, in any case, with surrounding whitespace ignored.
    pub fn is_exit_command(line: &str) -> bool {
        line.trim().eq_ignore_ascii_case(EXIT_COMMAND)
    }

    /// Send one user line and return the assistant's reply.
    ///
    /// The user and assistant messages are appended together once the reply is
    /// accepted. On error the transcript is unchanged, so the line can be retried.
    pub async fn respond(&mut self, line: &str) -> Result<String, AgentError> {
        let mut request = self.transcript.messages().to_vec();
        request.push(Message::user(line));
        debug!(messages = request.len(), "chat LLM call");

        let response = self
            .provider
            .chat(&request, None, &self.model, &self.request_config)
            .await?;
        response.validate()?;
        if response.has_tool_calls() {
            return Err(ModelError::Protocol(
                "chat reply requested tool calls but no tools were declared".into(),
            )
            .into());
        }

        let reply = response.content.clone().unwrap_or_default();
        self.transcript.push_user(line)?;
        self.transcript.push_assistant(response.content, Vec::new())?;
        Ok(reply)
    }

    /// Read lines until `exit` or end of input, replying to each non-blank line.
    pub async fn run<S, F>(&mut self, input: &mut S, mut on_reply: F) -> Result<SessionEnd, AgentError>
    where
        S: LineSource + ?Sized,
        F: FnMut(&str),
    {
        let mut turns = 0;
        loop {
            let Some(line) = input.read_line("You: ") else {
                break;
            };
            if Self::is_exit_command(&line) {
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let reply = self.respond(line).await?;
            on_reply(&reply);
            turns += 1;
        }
        info!(turns, "chat session ended");
        Ok(SessionEnd { turns })
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}
