//! # ravenadm-cli
//!
//! Command-line interface for database administration.
//!
//! ## Commands
//!
//! - `ravenadm compact <database>` - Compact a database and follow its progress
//! - `ravenadm compact-status <database>` - Show the last reported compaction status
//!
//! ## Configuration
//!
//! The CLI uses environment variables or command-line flags for settings:
//!
//! - `RAVENADM_SERVER_URL` - Server endpoint (default: `http://localhost:8080`)
//! - `RAVENADM_TIMEOUT_SECS` - Per-request timeout in seconds (default: `30`)
//! - `RAVENADM_LOG_FORMAT` - `pretty` or `json` logs on stderr (default: `pretty`)
//! - `RUST_LOG` - Log filter (default: `warn`)

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
// CLI uses print! macros intentionally
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

pub mod commands;

use std::time::Duration;

use clap::{Parser, Subcommand};
use ravenadm_core::observability::LogFormat;

/// ravenadm - database administration command-line interface.
#[derive(Debug, Parser)]
#[command(name = "ravenadm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database server URL.
    #[arg(long, env = "RAVENADM_SERVER_URL", default_value = "http://localhost:8080")]
    pub server_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "RAVENADM_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,

    /// Output format.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Log format on stderr (`pretty` or `json`).
    #[arg(long, env = "RAVENADM_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the effective configuration.
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            server_url: self.server_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            format: self.format,
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compact a database.
    Compact(commands::compact::CompactArgs),
    /// Show the last reported compaction status of a database.
    CompactStatus(commands::compact_status::CompactStatusArgs),
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// One JSON document per status update.
    Json,
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database server URL.
    pub server_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Output format.
    pub format: OutputFormat,
}
