//! Evlog Processor - change-log batch processing service

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use evlog_common::logging::{init_logging, LogConfig, LogLevel};
use evlog_common::EvlogError;
use evlog_processor::pipeline::BatchCoordinator;
use evlog_processor::{clients, Config, StreamEvent};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "evlog-processor")]
#[command(author, version, about = "Change-log batch processor")]
struct Cli {
    /// Path to a JSON batch file; "-" reads from stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over the verbose flag
    let log_config = LogConfig::from_env().unwrap_or_else(|_| LogConfig::new().with_level(log_level));
    init_logging(&log_config)?;

    let config = Config::load()?;

    // Parse the batch before opening any connection: a malformed batch
    // must not leave collaborators behind that no release path covers.
    let raw = read_batch(&cli.input)
        .with_context(|| format!("Failed to read batch from {}", cli.input))?;
    let event = StreamEvent::from_json(&raw)?;
    info!(records = event.records.len(), "processing batch");

    let collaborators = clients::connect(&config).await?;
    let coordinator = BatchCoordinator::new(
        config.relational_table.clone(),
        config.dispatch_config(),
        collaborators,
    );

    let report = coordinator.process_batch(event).await?;
    if !report.is_empty() {
        info!(failures = report.len(), "batch completed with failures");
    }

    // The report is the caller-facing result; a non-empty one is still a
    // successful invocation.
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read_batch(input: &str) -> evlog_common::Result<String> {
    if input == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        std::fs::read_to_string(input).map_err(EvlogError::Io)
    }
}
