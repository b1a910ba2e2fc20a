//! Error types for admin transport and compaction.

use ravenadm_core::{DatabaseName, ServerErrorBody};

/// Boxed error used for causes that do not have a dedicated variant.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by an [`AdminTransport`](crate::AdminTransport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request URL could not be built.
    #[error("invalid request URL: {message}")]
    InvalidUrl {
        /// Description of the problem.
        message: String,
    },

    /// The request could not be sent or no response was received.
    #[error("{message}")]
    Request {
        /// Description of the failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// The server answered with a non-success status.
    #[error("server returned {status} {status_text}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
        /// Raw response body.
        body: String,
    },

    /// The server answered successfully but the body could not be decoded.
    #[error("invalid response body: {message}")]
    InvalidResponse {
        /// Description of the decoding failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },
}

impl TransportError {
    /// Creates a request failure with an underlying cause.
    #[must_use]
    pub fn request(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Request {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a non-success status error.
    #[must_use]
    pub fn status(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// Returns the raw response body, when the server sent one.
    #[must_use]
    pub fn response_text(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    /// Returns the status text, or the failure description when there was no response.
    #[must_use]
    pub fn status_text(&self) -> String {
        match self {
            Self::Status {
                status,
                status_text,
                ..
            } => format!("{status} {status_text}").trim_end().to_string(),
            other => other.to_string(),
        }
    }

    /// Returns the server-reported reason for the failure.
    ///
    /// Uses the `Error` field of a JSON error body when present, otherwise
    /// falls back to the status text.
    #[must_use]
    pub fn server_message(&self) -> String {
        match self {
            Self::Status { body, .. } => ServerErrorBody::message_or(body, || self.status_text()),
            other => other.to_string(),
        }
    }
}

/// Errors that end a compaction attempt.
#[derive(Debug, thiserror::Error)]
pub enum CompactError {
    /// The stale status document could not be deleted; compaction was not requested.
    #[error("failed to delete compact status document for {database}: {source}")]
    StatusDocumentDelete {
        /// Compaction target.
        database: DatabaseName,
        /// Transport failure.
        #[source]
        source: TransportError,
    },

    /// The server did not accept the compaction request.
    #[error("failed to compact database {database}: {message}")]
    CompactRequest {
        /// Compaction target.
        database: DatabaseName,
        /// Reason delivered to the status callback.
        message: String,
        /// Transport failure.
        #[source]
        source: TransportError,
    },

    /// The server reported that compaction faulted.
    #[error("compaction of {database} faulted: {}", .messages.join("; "))]
    Faulted {
        /// Compaction target.
        database: DatabaseName,
        /// Messages from the final status document.
        messages: Vec<String>,
    },

    /// The monitor could not read the status document.
    #[error("gave up monitoring compaction of {database} after {attempts} failed polls: {source}")]
    Monitor {
        /// Compaction target.
        database: DatabaseName,
        /// Consecutive failed polls.
        attempts: u32,
        /// Last poll failure.
        #[source]
        source: BoxError,
    },

    /// The monitor stopped without settling the job.
    #[error("monitor for {database} stopped without reporting an outcome")]
    MonitorAbandoned {
        /// Compaction target.
        database: DatabaseName,
    },
}

impl CompactError {
    /// Returns the compaction target this error belongs to.
    #[must_use]
    pub fn database(&self) -> &DatabaseName {
        match self {
            Self::StatusDocumentDelete { database, .. }
            | Self::CompactRequest { database, .. }
            | Self::Faulted { database, .. }
            | Self::Monitor { database, .. }
            | Self::MonitorAbandoned { database } => database,
        }
    }
}
