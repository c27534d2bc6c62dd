//! `mnemo ingest` — One-shot scan of the knowledge inbox.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let stack = super::build_memory_stack(&config);
    let pipeline = super::build_pipeline(&config, stack.memory);

    println!(
        "📥 Scanning {} for *.{} documents",
        config.ingest.watch_dir.display(),
        config.ingest.extension
    );

    let report = pipeline.scan().await;
    if report.is_empty() {
        println!("   Nothing to ingest.");
        return Ok(());
    }

    println!();
    for file in &report.files {
        let marker = if file.marked {
            "marked .processed"
        } else {
            "rename FAILED, will be rescanned"
        };
        println!(
            "   {} — {} of {} segments stored ({marker})",
            file.name, file.stored, file.total
        );
    }

    println!();
    println!(
        "✅ {} document(s) processed, {} segment(s) stored.",
        report.files.len(),
        report.stored()
    );

    Ok(())
}
