//! Shared CLI helpers — colored output, prompt construction and the sample corpus.

use std::path::Path;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};

use toolchat_agent::Document;

/// System prompt for the one-shot `hello` command.
pub const HELLO_SYSTEM_PROMPT: &str = "You are a helpful assistant, answer any question.";

/// User prompt for the one-shot `hello` command.
pub const HELLO_USER_PROMPT: &str =
    "Say hello in the top european languages, exclude russian because its not part of europe";

const QA_INSTRUCTION: &str = "Answer the following question using the provided context. \
If you cannot answer the question with the context, don't lie and make up stuff. \
Just say you need more context.";

/// System prompt for the `qa` command.
pub const QA_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Answers questions to your best ability.";

/// Chunking separator for `qa` context files.
pub const QA_SEPARATOR: &str = ". ";

const MOVIES: [(&str, &str); 7] = [
    ("Step brothers", "Comedic journey full of adult humor and awkwardness."),
    ("The Matrix", "Deals with alternate realities and questioning what's real."),
    ("Shutter Island", "A mind-bending plot with twists and turns."),
    ("Memento", "A non-linear narrative that challenges the viewer's perception."),
    ("Doctor Strange", "Features alternate dimensions and reality manipulation."),
    (
        "Paw Patrol",
        "Children's animated movie where a group of adorable puppies save people.",
    ),
    ("Interstellar", "Features futuristic space travel with high stakes"),
];

/// Print a `[label] message` line in the given color.
pub fn sys_log(label: &str, message: &str, color: &str) {
    println!("{}", log_line(label, message, color));
}

/// Print a red `[error] message` line to stderr.
pub fn sys_error(message: &str) {
    eprintln!("{}", log_line("error", message, "red"));
}

fn log_line(label: &str, message: &str, color: &str) -> ColoredString {
    paint(&format!("[{label}] {message}"), color)
}

/// Apply a named color. Unknown names fall back to green.
fn paint(text: &str, color: &str) -> ColoredString {
    match color.to_ascii_lowercase().as_str() {
        "cyan" => text.cyan(),
        "yellow" => text.yellow(),
        "red" => text.red(),
        "blue" => text.blue(),
        "pink" => text.magenta().bold(),
        "white" => text.white(),
        _ => text.green(),
    }
}

/// Build the grounded question-answering prompt.
pub fn qa_prompt(question: &str, context: &str) -> String {
    format!("{QA_INSTRUCTION}\n\nQuestion: {question}\n\nContext:\n{context}")
}

/// Read a whole context document.
pub fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read context file: {}", path.display()))
}

/// The built-in movie list searched by `toolchat search`, one document per movie.
/// The source of each document is its 1-based id.
pub fn movie_documents() -> Vec<Document> {
    MOVIES
        .iter()
        .enumerate()
        .map(|(i, (title, description))| {
            Document::new(format!("Title: {title}\n{description}"), (i + 1).to_string())
        })
        .collect()
}

/// Distinct sources in first-seen order, joined with ", ".
pub fn join_sources<'a>(sources: impl IntoIterator<Item = &'a str>) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for source in sources {
        if !seen.contains(&source) {
            seen.push(source);
        }
    }
    seen.join(", ")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
