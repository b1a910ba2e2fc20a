//! Error types and result aliases shared across ravenadm crates.

/// The result type used throughout ravenadm-core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when constructing or decoding shared primitives.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An invalid database name was provided.
    #[error("invalid database name: {message}")]
    InvalidName {
        /// Description of what made the name invalid.
        message: String,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl Error {
    /// Creates a new invalid-name error.
    #[must_use]
    pub fn invalid_name(message: impl Into<String>) -> Self {
        Self::InvalidName {
            message: message.into(),
        }
    }

    /// Creates a serialization error wrapping a `serde_json` failure.
    #[must_use]
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source: Some(source),
        }
    }
}
