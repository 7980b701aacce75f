//! toolchat agent — tool registry, tool-calling loop, and plain chat session.
//!
//! This crate contains:
//! - **tools**: `Tool` trait, registry, and the built-in `calculate` tool
//! - **agent_loop**: the LLM ↔ tool-calling state machine
//! - **session**: the tool-less interactive chat session
//! - **retrieval**: in-memory embedding search used by `search` and `qa`

pub mod agent_loop;
pub mod retrieval;
pub mod session;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use agent_loop::{AgentLoop, AgentRun};
pub use retrieval::{Document, MemoryIndex, SearchHit};
pub use session::{ChatSession, LineSource, SessionEnd};
pub use tools::{FunctionTool, Tool, ToolRegistry};
