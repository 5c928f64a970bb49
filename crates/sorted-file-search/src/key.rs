//! Key types and key comparison modes
//!
//! A sorted file is ordered by the first field of every line. That field is
//! either compared byte-by-byte ([`KeyMode::Text`], the order produced by
//! `LC_ALL=C sort`) or as a signed integer ([`KeyMode::Integer`], the order
//! produced by `sort -n`).
//!
//! [`LineKey`] is the compile-time form used by [`crate::SortedFile`], and
//! [`Key`] is the runtime form used by [`crate::KeyedFileScanner`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the key field of each line is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    /// Byte-lexicographic comparison
    #[default]
    Text,
    /// Numeric comparison of signed 64-bit integers
    Integer,
}

impl fmt::Display for KeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Integer => f.write_str("integer"),
        }
    }
}

/// A key of either mode, checked against the scanner mode at query time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// Text key
    Text(String),
    /// Integer key
    Integer(i64),
}

impl Key {
    /// Mode this key belongs to
    pub const fn mode(&self) -> KeyMode {
        match self {
            Self::Text(_) => KeyMode::Text,
            Self::Integer(_) => KeyMode::Integer,
        }
    }

    /// Text value, if this is a text key
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Integer(_) => None,
        }
    }

    /// Integer value, if this is an integer key
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

/// A key type that can be parsed from the raw bytes of a line's first field.
///
/// The `Ord` implementation must agree with the order the file was sorted in.
pub trait LineKey: Ord + Clone + fmt::Debug + fmt::Display {
    /// Comparison mode this key type implements
    const MODE: KeyMode;

    /// Parse the raw key field (without separator or line terminator).
    ///
    /// The error string describes why the field is not a valid key.
    fn parse_key(raw: &[u8]) -> std::result::Result<Self, String>;

    /// Convert into the runtime key representation
    fn into_key(self) -> Key;

    /// Extract from the runtime representation, handing back mismatches.
    fn from_key(key: Key) -> std::result::Result<Self, Key>;
}

impl LineKey for String {
    const MODE: KeyMode = KeyMode::Text;

    fn parse_key(raw: &[u8]) -> std::result::Result<Self, String> {
        // `String` orders by its UTF-8 bytes, which is the byte-lexicographic
        // order the file is sorted by.
        Self::from_utf8(raw.to_vec()).map_err(|e| format!("key is not valid UTF-8: {e}"))
    }

    fn into_key(self) -> Key {
        Key::Text(self)
    }

    fn from_key(key: Key) -> std::result::Result<Self, Key> {
        match key {
            Key::Text(s) => Ok(s),
            other @ Key::Integer(_) => Err(other),
        }
    }
}

impl LineKey for i64 {
    const MODE: KeyMode = KeyMode::Integer;

    fn parse_key(raw: &[u8]) -> std::result::Result<Self, String> {
        let text = std::str::from_utf8(raw).map_err(|e| format!("key is not valid UTF-8: {e}"))?;

        // `sort -n` skips leading blanks, so surrounding whitespace is accepted
        text.trim()
            .parse::<Self>()
            .map_err(|e| format!("invalid integer key {text:?}: {e}"))
    }

    fn into_key(self) -> Key {
        Key::Integer(self)
    }

    fn from_key(key: Key) -> std::result::Result<Self, Key> {
        match key {
            Key::Integer(n) => Ok(n),
            other @ Key::Text(_) => Err(other),
        }
    }
}
