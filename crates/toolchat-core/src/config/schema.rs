//! Configuration schema.
//!
//! Hierarchy: `Config` → `ProviderConfig`, `AgentConfig`, `ChatConfig`, `QaConfig`,
//! `SearchConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant, answer any question.";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.toolchat/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub agent: AgentConfig,
    pub chat: ChatConfig,
    pub qa: QaConfig,
    pub search: SearchConfig,
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Connection settings for the OpenAI-compatible API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for Bearer authentication.
    pub api_key: String,
    /// API base URL, without the `/chat/completions` suffix.
    pub api_base: String,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            extra_headers: None,
            timeout_secs: 120,
        }
    }
}

impl ProviderConfig {
    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Agent (tool-augmented)
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Upper bound on model calls per run.
    pub max_rounds: u32,
    pub system_prompt: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.0,
            max_tokens: 1024,
            max_rounds: 20,
            system_prompt: "You are a helpful assistant. Use the calculate tool for any \
                            arithmetic instead of working it out yourself."
                .to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Chat (plain REPL)
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// QA (grounded answer over a document)
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QaConfig {
    pub model: String,
    /// Maximum characters per document chunk.
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks.
    pub chunk_overlap: usize,
    /// Chunks retrieved as context for one question.
    pub top_k: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo-16k".to_string(),
            chunk_size: 2500,
            chunk_overlap: 200,
            top_k: 1,
        }
    }
}

// ─────────────────────────────────────────────
// Search (embeddings)
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    /// Model used for every `/embeddings` call (search and qa).
    pub embedding_model: String,
    /// Results returned by `toolchat search`.
    pub top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            embedding_model: "text-embedding-ada-002".to_string(),
            top_k: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.provider.api_base, "https://api.openai.com/v1");
        assert!(!config.provider.is_configured());
        assert_eq!(config.agent.max_rounds, 20);
        assert_eq!(config.agent.temperature, 0.0);
        assert_eq!(config.chat.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.qa.model, "gpt-3.5-turbo-16k");
        assert_eq!(config.qa.top_k, 1);
        assert_eq!(config.search.embedding_model, "text-embedding-ada-002");
        assert_eq!(config.search.top_k, 3);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"agent": {"maxRounds": 3}, "provider": {"apiKey": "sk-1"}}"#)
                .unwrap();
        assert_eq!(config.agent.max_rounds, 3);
        assert_eq!(config.agent.model, "gpt-3.5-turbo");
        assert_eq!(config.provider.api_key, "sk-1");
        assert_eq!(config.provider.timeout_secs, 120);
    }

    #[test]
    fn test_serializes_camel_case() {
        let raw = serde_json::to_value(Config::default()).unwrap();
        assert!(raw["agent"].get("maxRounds").is_some());
        assert!(raw["qa"].get("chunkOverlap").is_some());
        assert!(raw["search"].get("embeddingModel").is_some());
        assert!(raw["provider"].get("extraHeaders").is_none());
    }
}
