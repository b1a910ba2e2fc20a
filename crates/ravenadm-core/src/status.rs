//! Compaction status documents and server error bodies.
//!
//! While a compaction runs, the server keeps a status document in the system
//! database at `Raven/Database/Compact/Status/<database>`. Clients delete it
//! before starting a new compaction so a stale outcome cannot be misread, and
//! poll it afterwards to follow progress.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::database::DatabaseName;
use crate::error::{Error, Result};

/// Key prefix of the per-database compaction status document.
pub const COMPACT_STATUS_KEY_PREFIX: &str = "Raven/Database/Compact/Status/";

/// Admin endpoint that starts a compaction. Takes a `database` query parameter.
pub const COMPACT_ENDPOINT: &str = "/admin/compact";

/// Returns the status document key for the given compaction target.
#[must_use]
pub fn compact_status_key(target: &DatabaseName) -> String {
    format!("{COMPACT_STATUS_KEY_PREFIX}{target}")
}

/// State of a compaction job as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompactState {
    /// Compaction is in progress.
    Running,
    /// Compaction finished successfully.
    Completed,
    /// Compaction failed.
    Faulted,
    /// A state this client does not recognize.
    #[serde(other)]
    Unknown,
}

impl CompactState {
    /// Returns true if no further updates are expected.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Faulted)
    }
}

impl fmt::Display for CompactState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Faulted => "Faulted",
            Self::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// A compaction status update.
///
/// Messages are cumulative: each update carries every message the server has
/// logged for the job so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompactStatus {
    /// Progress and error messages, oldest first.
    #[serde(default)]
    pub messages: Vec<String>,
    /// Current job state.
    pub state: CompactState,
    /// Most recent progress line, when the server reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_progress_message: Option<String>,
}

impl CompactStatus {
    /// Builds a terminal `Faulted` status carrying a single message.
    #[must_use]
    pub fn faulted(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
            state: CompactState::Faulted,
            last_progress_message: None,
        }
    }

    /// Decodes a status document fetched from the server.
    ///
    /// Document metadata and unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the document does not have the
    /// expected shape.
    pub fn from_document(document: serde_json::Value) -> Result<Self> {
        serde_json::from_value(document)
            .map_err(|e| Error::serialization("invalid compact status document", e))
    }
}

/// Error body returned by the server when an admin request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerErrorBody {
    /// Human-readable reason.
    #[serde(rename = "Error")]
    pub error: String,
}

impl ServerErrorBody {
    /// Parses an error response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the body is not JSON or has no
    /// string `Error` field.
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| Error::serialization("invalid error body", e))
    }

    /// Extracts the server's error message, or `fallback` if the body has no
    /// usable `Error` field.
    #[must_use]
    pub fn message_or(body: &str, fallback: impl FnOnce() -> String) -> String {
        match Self::parse(body) {
            Ok(parsed) => parsed.error,
            Err(err) => {
                tracing::debug!(error = %err, "error body has no Error field");
                fallback()
            }
        }
    }
}
