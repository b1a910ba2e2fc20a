//! # ravenadm-client
//!
//! Client-side database compaction for ravenadm.
//!
//! Starting a compaction is a strictly sequential hand-off:
//!
//! 1. Delete the stale status document for the target from the system database.
//! 2. `POST /admin/compact?database=<target>` against the system database.
//! 3. Start a [`CompactMonitor`] that polls the status document, reports
//!    every update to the caller's callback and settles the [`CompactionJob`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use ravenadm_client::{CompactionInitiator, HttpTransport, MonitorConfig};
//! use ravenadm_core::{CompactStatus, DatabaseName};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(HttpTransport::new("http://localhost:8080", Duration::from_secs(30))?);
//! let initiator = CompactionInitiator::new(transport, MonitorConfig::default());
//!
//! let job = initiator
//!     .start(
//!         DatabaseName::new("orders")?,
//!         Arc::new(|status: CompactStatus| println!("{}: {:?}", status.state, status.messages)),
//!     )
//!     .await?;
//! job.wait().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod initiator;
pub mod monitor;
pub mod report;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{CompactError, TransportError};
pub use initiator::CompactionInitiator;
pub use monitor::{
    CompactMonitor, CompactionJob, Completion, MonitorConfig, PollingMonitor, StatusCallback,
};
pub use report::{ErrorReporter, TracingReporter};
pub use transport::{AdminTransport, Document, HttpTransport};
