//! Error types for sorted file search operations

use crate::key::KeyMode;
use std::io;
use thiserror::Error;

/// Errors that can occur while searching a sorted file.
#[derive(Error, Debug)]
pub enum SearchError {
    /// I/O error while opening or reading the file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Query key type does not match the scanner's key mode.
    #[error("Invalid query: expected {expected} key, got {actual} key")]
    InvalidQuery {
        /// Mode the scanner was configured with
        expected: KeyMode,
        /// Mode of the rejected query
        actual: KeyMode,
    },

    /// No line carries the queried key.
    #[error("Key not found: {0}")]
    NotFound(String),

    /// A line could not be parsed into a record.
    #[error("Malformed line at offset {offset}: {reason}")]
    MalformedFile {
        /// Start offset of the offending line
        offset: u64,
        /// What was wrong with it
        reason: String,
    },

    /// The search reported a match but collected nothing.
    ///
    /// Either the bisection is broken or the file is not sorted.
    #[error("Search invariant violated: {0}")]
    InvariantViolation(String),

    /// Invalid scanner configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SearchError {
    /// Returns true for [`SearchError::NotFound`].
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub(crate) fn malformed(offset: u64, reason: impl Into<String>) -> Self {
        Self::MalformedFile {
            offset,
            reason: reason.into(),
        }
    }
}

/// Result type for sorted file search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
