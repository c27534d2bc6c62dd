//! `mnemo daemon` — Background knowledge ingestion loop.

use std::path::Path;
use std::time::Duration;
use tracing::info;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let stack = super::build_memory_stack(&config);
    let pipeline = super::build_pipeline(&config, stack.memory);

    println!("🧠 mnemo daemon — watching for knowledge documents");
    println!("   Inbox:     {}", config.ingest.watch_dir.display());
    println!("   Extension: .{}", config.ingest.extension);
    println!("   Interval:  {}s", config.ingest.scan_interval_secs);
    println!("   Memory:    {}", config.memory_server.base_url);
    println!("   Press Ctrl+C to stop.");
    println!();

    let (mut reports, handle) =
        pipeline.start(Duration::from_secs(config.ingest.scan_interval_secs));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                info!("Stopping ingest daemon");
                break;
            }
            report = reports.recv() => {
                match report {
                    Some(report) => {
                        for file in &report.files {
                            info!(
                                document = %file.name,
                                stored = file.stored,
                                total = file.total,
                                "Ingested document"
                            );
                        }
                    }
                    None => break,
                }
            }
        }
    }

    // Dropping the receiver stops the scan loop at its next send; wait for
    // any in-flight sweep to finish so no rename is cut short.
    drop(reports);
    let _ = handle.await;

    println!("✅ Daemon stopped.");

    Ok(())
}
