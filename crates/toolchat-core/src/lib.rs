//! toolchat core — the data model shared by every other crate.
//!
//! - [`types`]: OpenAI chat-completions messages, tool calls, tool definitions
//! - [`transcript`]: append-only conversation history with tool-call pairing checks
//! - [`error`]: error taxonomy for the model boundary, tools, and the agent loop
//! - [`config`]: config schema + loader

pub mod config;
pub mod error;
pub mod transcript;
pub mod types;
pub mod utils;

pub use error::{AgentError, ModelError, ToolError, TranscriptError};
pub use transcript::Transcript;
pub use types::{LlmResponse, Message, ToolCall, ToolChoice, ToolDefinition};
