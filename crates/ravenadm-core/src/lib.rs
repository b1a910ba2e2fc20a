//! # ravenadm-core
//!
//! Shared primitives for the ravenadm administration tooling.
//!
//! - **Database names**: validated identifiers for compaction targets
//! - **Compaction status**: the status document the server writes while compacting
//! - **Error types**: shared error definitions and result types
//! - **Observability**: logging initialization and span helpers
//!
//! ## Example
//!
//! ```rust
//! use ravenadm_core::{DatabaseName, compact_status_key};
//!
//! let target = DatabaseName::new("orders").unwrap();
//! assert_eq!(
//!     compact_status_key(&target),
//!     "Raven/Database/Compact/Status/orders"
//! );
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod database;
pub mod error;
pub mod observability;
pub mod status;

pub use database::DatabaseName;
pub use error::{Error, Result};
pub use status::{
    COMPACT_ENDPOINT, COMPACT_STATUS_KEY_PREFIX, CompactState, CompactStatus, ServerErrorBody,
    compact_status_key,
};

