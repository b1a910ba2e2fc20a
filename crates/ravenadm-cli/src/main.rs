//! ravenadm - database administration CLI.
//!
//! The main entry point for the `ravenadm` binary.

use anyhow::Result;
use clap::Parser;

use ravenadm_cli::{Cli, Commands};
use ravenadm_core::observability::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, "warn");

    let config = cli.config();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::Compact(args) => ravenadm_cli::commands::compact::execute(args, &config).await,
            Commands::CompactStatus(args) => {
                ravenadm_cli::commands::compact_status::execute(args, &config).await
            }
        }
    })
}
