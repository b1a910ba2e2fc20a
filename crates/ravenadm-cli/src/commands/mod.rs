//! CLI subcommands.

pub mod compact;
pub mod compact_status;

use std::sync::Arc;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use ravenadm_client::HttpTransport;
use ravenadm_core::CompactState;

use crate::Config;

fn connect(config: &Config) -> Result<Arc<HttpTransport>> {
    let transport = HttpTransport::new(&config.server_url, config.timeout)
        .with_context(|| format!("Invalid server URL '{}'", config.server_url))?;
    Ok(Arc::new(transport))
}

fn format_state_colored(state: CompactState) -> String {
    let label = state.to_string();
    match state {
        CompactState::Completed => label.green().to_string(),
        CompactState::Faulted => label.red().to_string(),
        CompactState::Running => label.blue().to_string(),
        CompactState::Unknown => label.dimmed().to_string(),
    }
}
