//! Database names.
//!
//! A [`DatabaseName`] identifies a compaction target. Admin requests about it
//! are always sent to the server's system database, which keeps
//! cross-database metadata such as compaction status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const MAX_NAME_LEN: usize = 260;

/// The name of a database on the server.
///
/// Names must be:
/// - Non-empty
/// - At most 260 characters
/// - Free of control characters
/// - Free of leading or trailing whitespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatabaseName(String);

impl DatabaseName {
    /// Creates a new database name after validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_name("database name cannot be empty"));
        }

        if name.chars().count() > MAX_NAME_LEN {
            return Err(Error::invalid_name(format!(
                "database name is too long (maximum {MAX_NAME_LEN} characters)"
            )));
        }

        if name.chars().any(char::is_control) {
            return Err(Error::invalid_name(format!(
                "database name '{}' contains control characters",
                name.escape_debug()
            )));
        }

        if name.trim() != name {
            return Err(Error::invalid_name(format!(
                "database name '{name}' cannot start or end with whitespace"
            )));
        }

        Ok(())
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DatabaseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for DatabaseName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for DatabaseName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DatabaseName> for String {
    fn from(value: DatabaseName) -> Self {
        value.0
    }
}
