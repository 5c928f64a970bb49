//! Configuration for keyed file scanners

use crate::error::{Result, SearchError};
use crate::key::KeyMode;
use serde::{Deserialize, Serialize};

/// Default field separator
pub const DEFAULT_SEPARATOR: char = '\t';

/// How the file contents are accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceBackend {
    /// Memory-map when possible, otherwise positional reads
    #[default]
    Auto,
    /// Always memory-map, fail if that is not possible
    Mmap,
    /// Always use positional reads on the file handle
    File,
}

/// Configuration for a [`crate::KeyedFileScanner`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Field separator, a single ASCII character other than a line break
    pub separator: char,

    /// Key comparison mode
    pub mode: KeyMode,

    /// File access backend
    pub backend: SourceBackend,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            mode: KeyMode::Text,
            backend: SourceBackend::Auto,
        }
    }
}

impl ScannerConfig {
    /// Text keys, tab separated
    pub fn text() -> Self {
        Self::default()
    }

    /// Integer keys, tab separated
    pub fn integer() -> Self {
        Self {
            mode: KeyMode::Integer,
            ..Self::default()
        }
    }

    /// Use a different field separator
    #[must_use]
    pub const fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Use a different key mode
    #[must_use]
    pub const fn with_mode(mut self, mode: KeyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Use a different file access backend
    #[must_use]
    pub const fn with_backend(mut self, backend: SourceBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Validate the configuration and return the separator byte.
    pub fn separator_byte(&self) -> Result<u8> {
        separator_byte(self.separator)
    }
}

/// Convert a separator character into the byte searched for on disk.
pub(crate) fn separator_byte(separator: char) -> Result<u8> {
    if !separator.is_ascii() {
        return Err(SearchError::Config(format!(
            "separator {separator:?} is not a single-byte ASCII character"
        )));
    }
    if separator == '\n' || separator == '\r' {
        return Err(SearchError::Config(format!(
            "separator {separator:?} collides with the line terminator"
        )));
    }
    Ok(separator as u8)
}
