//! `mnemo remember` — Store a durable user fact.

use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    fact: &str,
    session: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let stack = super::build_memory_stack(&config);

    if stack.memory.remember(session, fact).await {
        println!("✅ Remembered for session '{session}'.");
        Ok(())
    } else {
        Err(format!(
            "Memory store at {} did not acknowledge the write. Is it running?",
            config.memory_server.base_url
        )
        .into())
    }
}
