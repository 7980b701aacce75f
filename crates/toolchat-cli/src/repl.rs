//! Interactive line input for `toolchat chat`.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use toolchat_agent::LineSource;

/// Readline-backed [`LineSource`]. Ctrl-C and Ctrl-D end input.
pub struct ReplInput {
    editor: DefaultEditor,
}

impl ReplInput {
    /// Create an editor and load history from `~/.toolchat/history/chat_history`.
    pub fn new() -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        editor.set_max_history_size(1000)?;

        let path = history_path();
        if path.exists() {
            let _ = editor.load_history(&path);
            debug!("loaded REPL history from {}", path.display());
        }

        Ok(Self { editor })
    }

    /// Save history to disk.
    pub fn save_history(&mut self) {
        let path = history_path();
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = self.editor.save_history(&path) {
            debug!("failed to save history: {e}");
        }
    }
}

impl LineSource for ReplInput {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Some(line)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => None,
            Err(e) => {
                eprintln!("Input error: {e}");
                None
            }
        }
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    toolchat_core::utils::get_data_path()
        .join("history")
        .join("chat_history")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
