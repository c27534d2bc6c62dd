//! `mnemo chat` — Interactive or single-message chat mode.

use mnemo_agent::{ChatRequest, ReplySource};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    config_path: Option<&Path>,
    message: Option<String>,
    session: &str,
    remember: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let stack = super::build_memory_stack(&config);
    let orchestrator = super::build_orchestrator(&config, stack);

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let reply = orchestrator
            .chat(ChatRequest::new(session, msg).with_remember(remember))
            .await?;
        eprint!("\r              \r");
        println!("{}", reply.text);
        if reply.source == ReplySource::Cache {
            eprintln!("  (served from cache)");
        }
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  mnemo — Interactive Chat");
    println!("  ========================");
    println!("  Model:    {}", config.model.model);
    println!("  Session:  {session}");
    println!("  Memory:   {}", config.memory_server.base_url);
    println!("  Cache:    {}", config.cache.base_url);
    if remember {
        println!("  Remember: every message is stored as a user fact");
    }
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            break;
        }
        if text.is_empty() {
            print!("  You > ");
            std::io::stdout().flush()?;
            continue;
        }

        eprint!("  ...");
        let request = ChatRequest::new(session, text).with_remember(remember);
        match orchestrator.chat(request).await {
            Ok(reply) => {
                eprint!("\r     \r");
                println!();
                for out in reply.text.lines() {
                    println!("  Assistant > {out}");
                }
                if reply.source == ReplySource::Cache {
                    println!("  (served from cache)");
                }
                println!();
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}
