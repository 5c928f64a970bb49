//! Parsed lines of a sorted file

use crate::key::{Key, LineKey};
use serde::{Deserialize, Serialize};

/// A single line of a sorted file, split on the separator.
///
/// The key is the first field, parsed according to the file's key mode. The
/// remaining fields are kept as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record<K> {
    key: K,
    fields: Vec<String>,
}

impl<K> Record<K> {
    /// Create a record from a key and its trailing fields
    pub fn new<I, F>(key: impl Into<K>, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Self {
            key: key.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The parsed key field
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Fields following the key
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field by index, where index 0 is the first field after the key
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Number of fields including the key
    pub fn len(&self) -> usize {
        self.fields.len() + 1
    }

    /// Always false, a record carries at least its key
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Split into key and trailing fields
    pub fn into_parts(self) -> (K, Vec<String>) {
        (self.key, self.fields)
    }

    /// Transform the key while keeping the fields
    pub fn map_key<T>(self, f: impl FnOnce(K) -> T) -> Record<T> {
        Record {
            key: f(self.key),
            fields: self.fields,
        }
    }
}

impl<K: LineKey> Record<K> {
    /// Convert into a record carrying a runtime [`Key`]
    pub fn into_dynamic(self) -> Record<Key> {
        self.map_key(LineKey::into_key)
    }
}

/// Raw key field of a line: everything up to the first separator.
pub(crate) fn key_field(content: &[u8], separator: u8) -> &[u8] {
    content
        .iter()
        .position(|&b| b == separator)
        .map_or(content, |pos| &content[..pos])
}

/// Parse the fields after the key.
///
/// `content` is the whole line without its terminator.
pub(crate) fn parse_fields(
    content: &[u8],
    separator: u8,
) -> std::result::Result<Vec<String>, String> {
    let Some(pos) = content.iter().position(|&b| b == separator) else {
        return Ok(Vec::new());
    };

    content[pos + 1..]
        .split(|&b| b == separator)
        .enumerate()
        .map(|(i, raw)| {
            String::from_utf8(raw.to_vec())
                .map_err(|e| format!("field {} is not valid UTF-8: {e}", i + 1))
        })
        .collect()
}

/// Parse a whole line into a record.
#[cfg(test)]
pub(crate) fn parse_record<K: LineKey>(
    content: &[u8],
    separator: u8,
) -> std::result::Result<Record<K>, String> {
    let key = K::parse_key(key_field(content, separator))?;
    let fields = parse_fields(content, separator)?;
    Ok(Record { key, fields })
}
