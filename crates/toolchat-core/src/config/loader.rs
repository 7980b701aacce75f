//! Config loader — reads `~/.toolchat/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.toolchat/config.json`
//! 3. Environment variables `TOOLCHAT_<SECTION>__<FIELD>` (override JSON)
//! 4. `OPENAI_API_KEY` / `OPENAI_BASE_URL`, only where 1–3 left the provider unset

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, DEFAULT_API_BASE};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the given path (or the default one) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let config = load_config_from_path(&config_path);
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment overrides on top of a loaded config.
///
/// Env var format: `TOOLCHAT_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `TOOLCHAT_PROVIDER__API_KEY`, `TOOLCHAT_PROVIDER__API_BASE`
/// - `TOOLCHAT_AGENT__MODEL`, `TOOLCHAT_AGENT__TEMPERATURE`, `TOOLCHAT_AGENT__MAX_ROUNDS`
/// - `TOOLCHAT_CHAT__MODEL`, `TOOLCHAT_CHAT__TEMPERATURE`
/// - `TOOLCHAT_QA__MODEL`
/// - `TOOLCHAT_SEARCH__EMBEDDING_MODEL`, `TOOLCHAT_SEARCH__TOP_K`
///
/// Unparseable numeric values are ignored with a warning.
fn apply_env_overrides(mut config: Config, env: impl Fn(&str) -> Option<String>) -> Config {
    // Provider
    if let Some(val) = env("TOOLCHAT_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Some(val) = env("TOOLCHAT_PROVIDER__API_BASE") {
        config.provider.api_base = val;
    }

    // Agent
    if let Some(val) = env("TOOLCHAT_AGENT__MODEL") {
        config.agent.model = val;
    }
    if let Some(t) = parse_env(&env, "TOOLCHAT_AGENT__TEMPERATURE") {
        config.agent.temperature = t;
    }
    if let Some(n) = parse_env(&env, "TOOLCHAT_AGENT__MAX_ROUNDS") {
        config.agent.max_rounds = n;
    }

    // Chat
    if let Some(val) = env("TOOLCHAT_CHAT__MODEL") {
        config.chat.model = val;
    }
    if let Some(t) = parse_env(&env, "TOOLCHAT_CHAT__TEMPERATURE") {
        config.chat.temperature = t;
    }

    // QA
    if let Some(val) = env("TOOLCHAT_QA__MODEL") {
        config.qa.model = val;
    }

    // Search
    if let Some(val) = env("TOOLCHAT_SEARCH__EMBEDDING_MODEL") {
        config.search.embedding_model = val;
    }
    if let Some(n) = parse_env(&env, "TOOLCHAT_SEARCH__TOP_K") {
        config.search.top_k = n;
    }

    // Conventional OpenAI variables fill whatever is still unset
    if config.provider.api_key.is_empty() {
        if let Some(val) = env("OPENAI_API_KEY") {
            config.provider.api_key = val;
        }
    }
    if config.provider.api_base == DEFAULT_API_BASE {
        if let Some(val) = env("OPENAI_BASE_URL") {
            config.provider.api_base = val;
        }
    }

    config
}

fn parse_env<T: std::str::FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = env(key)?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable env override");
            None
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
