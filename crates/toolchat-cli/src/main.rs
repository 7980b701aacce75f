//! toolchat CLI — entry point.
//!
//! # Commands
//!
//! - `toolchat ask [QUESTION]` — agent with the `calculate` tool
//! - `toolchat chat` — interactive REPL until `exit`
//! - `toolchat hello` — one-shot greeting prompt
//! - `toolchat qa [QUESTION] --context <FILE>` — grounded answer over the best-matching
//!   chunks of a text file
//! - `toolchat search [QUERY]` — semantic search over a built-in movie list

mod helpers;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use toolchat_agent::tools::CalculateTool;
use toolchat_agent::retrieval::split_text;
use toolchat_agent::{AgentLoop, ChatSession, Document, MemoryIndex, ToolRegistry};
use toolchat_core::config::{load_config, Config};
use toolchat_core::types::Message;
use toolchat_core::utils::{expand_home, truncate_string};
use toolchat_providers::{HttpProvider, LlmProvider, LlmRequestConfig};

use crate::helpers::{sys_error, sys_log};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Chat with an OpenAI-compatible model, with or without local tools
#[derive(Parser)]
#[command(name = "toolchat", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    /// Config file (default: ~/.toolchat/config.json)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question; the model may call the calculate tool
    Ask {
        #[arg(default_value = "hi")]
        question: String,
    },

    /// Interactive chat until "exit"
    Chat,

    /// Greet in the top European languages
    Hello,

    /// Answer a question from a local text document
    Qa {
        #[arg(default_value = "What safety should I take when playing Xbox?")]
        question: String,

        /// Plain-text file used as context
        #[arg(short, long)]
        context: String,
    },

    /// Find the movies closest to a description
    Search {
        #[arg(default_value = "An adult comedy")]
        query: String,

        /// Number of results (default: search.topK)
        #[arg(short = 'k', long)]
        count: Option<usize>,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.logs);

    if let Err(e) = run(cli).await {
        sys_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref().map(expand_home);
    let config = load_config(config_path.as_deref());
    if !config.provider.is_configured() {
        sys_log(
            "config",
            "no API key configured; set OPENAI_API_KEY or provider.apiKey",
            "yellow",
        );
    }

    let provider: Arc<dyn LlmProvider> = Arc::new(
        HttpProvider::new(&config.provider).context("failed to build HTTP client")?,
    );

    match cli.command {
        Commands::Ask { question } => run_ask(&config, provider, &question).await,
        Commands::Chat => run_chat(&config, provider).await,
        Commands::Hello => run_hello(&config, provider).await,
        Commands::Qa { question, context } => {
            run_qa(&config, provider, &question, expand_home(&context)).await
        }
        Commands::Search { query, count } => {
            let count = count.unwrap_or(config.search.top_k);
            run_search(&config, provider, &query, count).await
        }
    }
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

async fn run_ask(config: &Config, provider: Arc<dyn LlmProvider>, question: &str) -> Result<()> {
    let agent_config = &config.agent;

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(CalculateTool))?;

    let agent = AgentLoop::new(provider, Arc::new(registry), agent_config.model.as_str())
        .with_max_rounds(agent_config.max_rounds as usize)
        .with_system_prompt(agent_config.system_prompt.as_str())
        .with_request_config(LlmRequestConfig {
            max_tokens: agent_config.max_tokens,
            temperature: agent_config.temperature,
        });

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("received Ctrl+C, stopping after the current round");
            ctrl_c.cancel();
        }
    });

    sys_log("user", question, "cyan");
    let run = agent
        .run_with_cancel(question, &cancel)
        .await
        .context("agent run failed")?;
    info!(rounds = run.rounds, messages = run.transcript.len(), "agent run finished");
    sys_log("assistant", &run.answer, "green");
    Ok(())
}

async fn run_chat(config: &Config, provider: Arc<dyn LlmProvider>) -> Result<()> {
    let chat_config = &config.chat;
    let mut session = ChatSession::new(
        provider,
        chat_config.model.as_str(),
        LlmRequestConfig {
            max_tokens: chat_config.max_tokens,
            temperature: chat_config.temperature,
        },
        chat_config.system_prompt.as_str(),
    );

    sys_log("chat", "Type a message, or \"exit\" to quit.", "blue");
    let mut input = repl::ReplInput::new()?;
    let result = session
        .run(&mut input, |reply| sys_log("assistant", reply, "green"))
        .await;
    input.save_history();

    let end = result.context("chat session failed")?;
    sys_log("chat", &format!("Goodbye after {} turn(s).", end.turns), "pink");
    Ok(())
}

async fn run_hello(config: &Config, provider: Arc<dyn LlmProvider>) -> Result<()> {
    let messages = [
        Message::system(helpers::HELLO_SYSTEM_PROMPT),
        Message::user(helpers::HELLO_USER_PROMPT),
    ];
    let request = LlmRequestConfig {
        max_tokens: config.chat.max_tokens,
        temperature: config.chat.temperature,
    };

    let response = provider
        .chat(&messages, None, &config.chat.model, &request)
        .await
        .context("hello request failed")?;
    println!("Response: {}", response.text_or_empty());
    Ok(())
}

async fn run_qa(
    config: &Config,
    provider: Arc<dyn LlmProvider>,
    question: &str,
    context_path: PathBuf,
) -> Result<()> {
    let qa = &config.qa;
    let source = context_path.display().to_string();
    let text = helpers::read_document(&context_path)?;
    let chunks: Vec<Document> =
        split_text(&text, helpers::QA_SEPARATOR, qa.chunk_size, qa.chunk_overlap)
            .into_iter()
            .map(|chunk| Document::new(chunk, source.as_str()))
            .collect();
    info!(chunks = chunks.len(), file = %source, "qa context split");

    let index = MemoryIndex::build(provider.clone(), config.search.embedding_model.as_str(), chunks)
        .await
        .context("failed to embed context")?;
    let hits = index
        .search(question, qa.top_k.max(1))
        .await
        .context("context search failed")?;
    let context = hits
        .iter()
        .map(|hit| hit.document.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let messages = [
        Message::system(helpers::QA_SYSTEM_PROMPT),
        Message::user(helpers::qa_prompt(question, &context)),
    ];
    let request = LlmRequestConfig {
        max_tokens: LlmRequestConfig::default().max_tokens,
        temperature: 0.0,
    };

    sys_log("question", question, "cyan");
    let response = provider
        .chat(&messages, None, &qa.model, &request)
        .await
        .context("qa request failed")?;
    println!("{}", response.text_or_empty());
    let sources = helpers::join_sources(hits.iter().map(|hit| hit.document.source.as_str()));
    println!("Sources: {sources}");
    Ok(())
}

async fn run_search(
    config: &Config,
    provider: Arc<dyn LlmProvider>,
    query: &str,
    count: usize,
) -> Result<()> {
    let index = MemoryIndex::build(
        provider,
        config.search.embedding_model.as_str(),
        helpers::movie_documents(),
    )
    .await
    .context("failed to embed movie list")?;

    sys_log("search", query, "cyan");
    let hits = index.search(query, count).await.context("search failed")?;
    for hit in &hits {
        let summary = hit.document.content.replace('\n', " | ");
        sys_log(
            &format!("{:.3}", hit.score),
            &truncate_string(&summary, 100),
            "green",
        );
    }
    if hits.is_empty() {
        sys_log("search", "no results", "yellow");
    }
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("toolchat=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
