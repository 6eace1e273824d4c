//! Terminal front-end for skillroute sessions.
//!
//! Reads the API key from the `OPENROUTER_KEY` environment variable.
//!
//! # Examples
//!
//! ```sh
//! # Interactive REPL
//! skillroute --router-model anthropic/claude-3.5-haiku
//!
//! # One-shot mode
//! skillroute --prompt "What's the weather in Paris?"
//!
//! # Show the skill catalog
//! skillroute --list-skills
//! ```

mod config;

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use skillroute::prelude::*;
use skillroute::skills::builtin::builtin_skills;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::CliConfig;

const HELP: &str = "\
Commands:
  /skills   list available skills
  /loaded   list skills loaded this session
  /tools    list tools the agent currently holds
  /clear    clear history, tools, and loaded skills
  /help     show this help
  /quit     exit
Anything else is sent as a message.";

/// Chat with an agent that loads skills on demand.
#[derive(Parser)]
#[command(name = "skillroute")]
struct Cli {
    /// Single message to answer (one-shot mode). Without this, starts the REPL.
    #[arg(long)]
    prompt: Option<String>,

    /// Model for conversational turns.
    #[arg(long, default_value = skillroute::DEFAULT_MODEL)]
    model: String,

    /// Model for routing calls. Defaults to --model.
    #[arg(long)]
    router_model: Option<String>,

    /// Maximum model round-trips per turn.
    #[arg(long, default_value_t = 8)]
    max_rounds: u32,

    /// Maximum tokens per LLM response.
    #[arg(long, default_value_t = 4096)]
    max_tokens: u32,

    /// Sampling temperature.
    #[arg(long, default_value_t = 0.7)]
    temperature: f32,

    /// Retries for transient provider errors.
    #[arg(long, default_value_t = 2)]
    retries: u32,

    /// Print the skill catalog and exit.
    #[arg(long)]
    list_skills: bool,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> CliConfig {
        CliConfig {
            model: self.model.clone(),
            router_model: self.router_model.clone(),
            max_rounds: self.max_rounds,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            retries: self.retries,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "skillroute=debug" } else { "skillroute=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_catalog() {
    let mut registry = SkillRegistry::new();
    registry.register_all(builtin_skills());
    for skill in registry.summaries() {
        println!("{:<12} {}", skill.name, skill.description);
    }
}

/// Echo skill loads and tool calls to stderr.
fn console_handler() -> impl EventHandler {
    FnEventHandler::new(|event| match event {
        SessionEvent::SkillLoaded { name, tools } => {
            eprintln!("[skill] {name}: {}", tools.join(", "));
        }
        SessionEvent::ToolExecuting { name, arguments } => {
            eprintln!("[tool] {name} {arguments}");
        }
        _ => {}
    })
}

async fn answer(session: &mut Orchestrator, text: &str) {
    match session.run(text).await {
        Ok(reply) => println!("{reply}\n"),
        Err(e) => eprintln!("Error: {e}\n"),
    }
}

async fn repl(session: &mut Orchestrator) {
    println!("skillroute. Type /help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error: failed to read input: {e}");
                break;
            }
        };
        let input = line.trim();
        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => println!("{HELP}"),
            "/skills" => {
                for skill in session.get_available_skills() {
                    println!("  {:<12} {}", skill.name, skill.description);
                }
            }
            "/loaded" => println!("  {:?}", session.get_loaded_skills()),
            "/tools" => println!("  {:?}", session.active_tool_names()),
            "/clear" => match session.clear_history() {
                Ok(()) => println!("  history cleared"),
                Err(e) => eprintln!("Error: {e}"),
            },
            _ if input.starts_with('/') => println!("Unknown command {input}. Try /help."),
            _ => answer(session, input).await,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list_skills {
        print_catalog();
        return;
    }

    let api_key = match std::env::var("OPENROUTER_KEY") {
        Ok(key) => key,
        Err(_) => {
            error!("OPENROUTER_KEY is not set");
            eprintln!("Error: OPENROUTER_KEY environment variable is not set");
            std::process::exit(1);
        }
    };

    let client = match OpenRouterClient::with_headers(
        api_key,
        "https://github.com/skillroute/skillroute",
        "skillroute",
    ) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create API client: {e}");
            eprintln!("Error: failed to create API client: {e}");
            std::process::exit(1);
        }
    };

    let handler = CompositeEventHandler::new()
        .with(LoggingHandler)
        .with(console_handler());
    let agent_config = cli.config().build_agent_config();
    info!(
        model = %agent_config.model,
        router_model = %agent_config.router_model(),
        one_shot = cli.prompt.is_some(),
        "Starting session"
    );
    let mut session = Orchestrator::with_builtin_skills(Arc::new(client), agent_config)
        .with_event_handler(Arc::new(handler));

    if let Err(e) = session.initialize() {
        error!("Session initialization failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    match &cli.prompt {
        Some(prompt) => answer(&mut session, prompt).await,
        None => repl(&mut session).await,
    }

    info!(
        turns = session.history_len() / 2,
        loaded = ?session.get_loaded_skills(),
        "Shutting down"
    );
    if let Err(e) = session.shutdown() {
        error!("Skill cleanup failed: {e}");
        eprintln!("Error: {e}");
    }
}
