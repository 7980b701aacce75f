//! Error taxonomy.
//!
//! Only [`ModelError`] is fatal to a run. [`ToolError`]s raised while dispatching a
//! tool call are folded back into the conversation as error-content tool messages.

use thiserror::Error;

/// Failures at the Model Client boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// Transport failure or non-success HTTP status.
    #[error("model unavailable: {0}")]
    Unavailable(String),

    /// The reply does not have the shape the protocol requires.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Failures scoped to a single tool (registration or one tool call).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ToolError {
    #[error("tool '{0}' is already registered")]
    Duplicate(String),

    #[error("tool '{0}' not found")]
    NotFound(String),

    #[error("invalid arguments for tool '{name}': {reason}")]
    ArgumentDecode { name: String, reason: String },

    #[error("tool '{name}' failed: {reason}")]
    Execution { name: String, reason: String },
}

/// Appends that would break the assistant/tool pairing of a transcript.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TranscriptError {
    #[error("tool result for '{got}' does not answer the next pending call ({expected:?})")]
    UnexpectedToolResult {
        expected: Option<String>,
        got: String,
    },

    #[error("{0} tool call(s) still awaiting results")]
    UnresolvedToolCalls(usize),

    #[error("tool call id '{0}' appears twice in one assistant message")]
    DuplicateToolCallId(String),
}

/// Errors that end an agent run or chat session.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error("model still requesting tools after {rounds} rounds")]
    MaxRoundsExceeded { rounds: usize },

    #[error("run cancelled")]
    Cancelled,
}
