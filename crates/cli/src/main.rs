//! mnemo CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Interactive chat or single-message mode
//! - `remember` — Store a durable user fact
//! - `ingest`   — Scan the knowledge inbox once
//! - `daemon`   — Run the background ingestion loop
//! - `config`   — Show, initialize, or locate the config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "mnemo",
    about = "mnemo — tiered memory and semantic caching for conversational assistants",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a config file (defaults to ~/.mnemo/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Session id scoping the conversation window and personal memory
        #[arg(short, long, default_value = "local")]
        session: String,

        /// Also store each sent message as a durable user fact
        #[arg(long)]
        remember: bool,
    },

    /// Store a durable fact about the user
    Remember {
        /// The fact to store
        fact: String,

        /// Session id the fact belongs to
        #[arg(short, long, default_value = "local")]
        session: String,
    },

    /// Scan the knowledge inbox once and ingest pending documents
    Ingest,

    /// Run the background ingestion daemon
    Daemon,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Write a default config file
    Init,

    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Chat {
            message,
            session,
            remember,
        } => commands::chat::run(config_path, message, &session, remember).await?,
        Commands::Remember { fact, session } => {
            commands::remember::run(config_path, &fact, &session).await?
        }
        Commands::Ingest => commands::ingest::run(config_path).await?,
        Commands::Daemon => commands::daemon::run(config_path).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config_path).await?,
            ConfigAction::Init => commands::config_cmd::init().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn chat_args_parse() {
        let cli = Cli::parse_from(["mnemo", "chat", "-m", "hello", "--session", "s-1"]);
        match cli.command {
            Commands::Chat {
                message, session, ..
            } => {
                assert_eq!(message.as_deref(), Some("hello"));
                assert_eq!(session, "s-1");
            }
            _ => panic!("expected chat subcommand"),
        }
    }
}
