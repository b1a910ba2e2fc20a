//! Compact command - compact a database and follow its progress.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;

use ravenadm_client::{CompactionInitiator, MonitorConfig, StatusCallback};
use ravenadm_core::{CompactStatus, DatabaseName};

use super::{connect, format_state_colored};
use crate::{Config, OutputFormat};

/// Arguments for the compact command.
#[derive(Debug, Args)]
pub struct CompactArgs {
    /// Database to compact.
    #[arg()]
    pub database: DatabaseName,

    /// Return once the server accepts the request instead of waiting for completion.
    #[arg(long, short = 'd')]
    pub detach: bool,

    /// Status poll interval in milliseconds.
    #[arg(long, default_value = "1000")]
    pub poll_interval_ms: u64,

    /// Consecutive failed status polls tolerated before giving up.
    #[arg(long, default_value = "5")]
    pub max_poll_failures: u32,
}

impl CompactArgs {
    fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_consecutive_failures: self.max_poll_failures,
        }
    }
}

/// Execute the compact command.
///
/// # Errors
///
/// Returns an error if the server URL is invalid, the server does not accept
/// the compaction, or (unless detached) the compaction does not complete.
pub async fn execute(args: CompactArgs, config: &Config) -> Result<()> {
    let initiator = CompactionInitiator::new(connect(config)?, args.monitor_config());
    let printer = Arc::new(StatusPrinter::new(config.format));
    let callback: StatusCallback = {
        let printer = printer.clone();
        Arc::new(move |status| printer.print(&status))
    };

    let database = args.database.clone();
    let job = initiator
        .start(database.clone(), callback)
        .await
        .with_context(|| format!("Failed to start compaction of '{database}'"))?;

    if config.format == OutputFormat::Text {
        println!("Compaction of {} started", database.bold());
    }

    if args.detach {
        return Ok(());
    }

    job.wait()
        .await
        .with_context(|| format!("Compaction of '{database}' did not complete"))?;

    if config.format == OutputFormat::Text {
        println!("Compaction of {} completed", database.bold());
    }
    Ok(())
}

/// Prints status updates as they arrive.
///
/// Status messages are cumulative, so text output only prints the messages
/// not seen in a previous update.
struct StatusPrinter {
    format: OutputFormat,
    printed: Mutex<usize>,
}

impl StatusPrinter {
    fn new(format: OutputFormat) -> Self {
        Self {
            format,
            printed: Mutex::new(0),
        }
    }

    fn print(&self, status: &CompactStatus) {
        match self.format {
            OutputFormat::Json => match serde_json::to_string(status) {
                Ok(line) => println!("{line}"),
                Err(err) => tracing::warn!(error = %err, "failed to serialize status"),
            },
            OutputFormat::Text => {
                for line in self.unseen(status) {
                    println!("  [{}] {line}", format_state_colored(status.state));
                }
            }
        }
    }

    fn unseen<'a>(&self, status: &'a CompactStatus) -> &'a [String] {
        let mut printed = self.printed.lock().unwrap_or_else(PoisonError::into_inner);
        // A shorter list means the server started a new status document.
        let start = if *printed > status.messages.len() {
            0
        } else {
            *printed
        };
        *printed = status.messages.len();
        &status.messages[start..]
    }
}
