//! Compact-status command - show the last reported compaction status.

use anyhow::{Context, Result};
use clap::Args;

use ravenadm_client::AdminTransport;
use ravenadm_core::{CompactStatus, DatabaseName, compact_status_key};

use super::{connect, format_state_colored};
use crate::{Config, OutputFormat};

/// Arguments for the compact-status command.
#[derive(Debug, Args)]
pub struct CompactStatusArgs {
    /// Database whose compaction status to show.
    #[arg()]
    pub database: DatabaseName,
}

/// Execute the compact-status command.
///
/// # Errors
///
/// Returns an error if the server URL is invalid, the request fails or the
/// status document cannot be decoded.
pub async fn execute(args: CompactStatusArgs, config: &Config) -> Result<()> {
    let transport = connect(config)?;
    let key = compact_status_key(&args.database);

    let document = transport
        .get_document(&key)
        .await
        .with_context(|| format!("Failed to fetch compaction status of '{}'", args.database))?;

    let Some(document) = document else {
        match config.format {
            OutputFormat::Json => println!("null"),
            OutputFormat::Text => {
                println!("No compaction status recorded for {}", args.database);
            }
        }
        return Ok(());
    };

    let status = CompactStatus::from_document(document.body)
        .context("Invalid compaction status document")?;

    match config.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "database": args.database,
                    "status": status,
                    "etag": document.etag,
                    "lastModified": document.last_modified,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("Database: {}", args.database);
            println!("State: {}", format_state_colored(status.state));
            if let Some(last_modified) = &document.last_modified {
                println!("Updated: {last_modified}");
            }
            if let Some(etag) = &document.etag {
                println!("Etag: {etag}");
            }
            if let Some(progress) = &status.last_progress_message {
                println!("Progress: {progress}");
            }
            if !status.messages.is_empty() {
                println!();
                println!("Messages:");
                for message in &status.messages {
                    println!("  {message}");
                }
            }
        }
    }

    Ok(())
}
