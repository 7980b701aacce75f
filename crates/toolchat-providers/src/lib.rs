//! Model Client layer for toolchat.
//!
//! - [`traits::LlmProvider`] — the boundary the agent loop and chat session call
//! - [`http_provider::HttpProvider`] — client for any OpenAI-compatible `/chat/completions`

pub mod http_provider;
pub mod traits;

pub use http_provider::HttpProvider;
pub use traits::{LlmProvider, LlmRequestConfig};
