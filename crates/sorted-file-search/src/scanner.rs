//! Runtime-configured scanner over a sorted file
//!
//! [`KeyedFileScanner`] picks the key mode from a [`ScannerConfig`] instead of
//! a type parameter. Queries carry a [`Key`] and are rejected with
//! [`SearchError::InvalidQuery`] before any read when their mode does not match.

use crate::config::ScannerConfig;
use crate::error::{Result, SearchError};
use crate::key::{Key, KeyMode, LineKey};
use crate::record::Record;
use crate::sorted_file::SortedFile;
use crate::sortedness::SortViolation;
use crate::source::{FileSource, ReadAt};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
enum Inner<S> {
    Text(SortedFile<String, S>),
    Integer(SortedFile<i64, S>),
}

/// Run `$body` against the typed file, with `$query` converted to its key type.
macro_rules! with_typed_query {
    ($inner:expr, $query:expr, |$file:ident, $typed:ident| $body:expr) => {
        match $inner {
            Inner::Text($file) => {
                let $typed: String = typed_query($query)?;
                $body
            }
            Inner::Integer($file) => {
                let $typed: i64 = typed_query($query)?;
                $body
            }
        }
    };
}

fn typed_query<K: LineKey>(query: Key) -> Result<K> {
    K::from_key(query).map_err(|rejected| SearchError::InvalidQuery {
        expected: K::MODE,
        actual: rejected.mode(),
    })
}

/// Binary search scanner over a key-sorted text file.
///
/// The file length is cached when the scanner is opened. Every query
/// bisects byte offsets to find a matching line, walks back to the first line
/// of the key's run and collects the run.
///
/// # Example
///
/// ```no_run
/// use sorted_file_search::{KeyedFileScanner, Record, ScannerConfig};
///
/// let scanner = KeyedFileScanner::open("nodes.sorted", ScannerConfig::text())?;
/// for record in scanner.search("bA")? {
///     println!("{} -> {:?}", record.key(), record.fields());
/// }
/// # Ok::<(), sorted_file_search::SearchError>(())
/// ```
#[derive(Debug)]
pub struct KeyedFileScanner<S = FileSource> {
    inner: Inner<S>,
    config: ScannerConfig,
    path: Option<PathBuf>,
}

impl KeyedFileScanner<FileSource> {
    /// Open `path` and cache its length.
    pub fn open(path: impl AsRef<Path>, config: ScannerConfig) -> Result<Self> {
        let path = path.as_ref();
        config.separator_byte()?;

        let source = FileSource::open(path, config.backend)?;
        let mut scanner = Self::from_source(source, config)?;
        scanner.path = Some(path.to_path_buf());
        Ok(scanner)
    }

    /// Attach to another file or configuration.
    ///
    /// The new file is opened before the current one is released, so on error
    /// the scanner stays attached to its previous file.
    pub fn reopen(&mut self, path: impl AsRef<Path>, config: ScannerConfig) -> Result<()> {
        let reopened = Self::open(path, config)?;
        debug!("Reopening scanner: {:?} -> {:?}", self.path, reopened.path);
        *self = reopened;
        Ok(())
    }
}

impl<S: ReadAt> KeyedFileScanner<S> {
    /// Attach to an already opened source.
    pub fn from_source(source: S, config: ScannerConfig) -> Result<Self> {
        let inner = match config.mode {
            KeyMode::Text => Inner::Text(SortedFile::new(source, config.separator)?),
            KeyMode::Integer => Inner::Integer(SortedFile::new(source, config.separator)?),
        };

        Ok(Self {
            inner,
            config,
            path: None,
        })
    }

    /// Replace the source and configuration, recomputing the cached length.
    pub fn reattach(&mut self, source: S, config: ScannerConfig) -> Result<()> {
        *self = Self::from_source(source, config)?;
        Ok(())
    }

    /// Release the underlying source
    pub fn close(self) {
        debug!("Closing scanner for {:?}", self.path);
    }

    /// Active configuration
    pub const fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Path the scanner was opened from, if opened from a path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Key comparison mode
    pub const fn mode(&self) -> KeyMode {
        self.config.mode
    }

    /// Field separator
    pub const fn separator(&self) -> char {
        self.config.separator
    }

    /// File length in bytes, as cached on open
    pub const fn len(&self) -> u64 {
        match &self.inner {
            Inner::Text(file) => file.len(),
            Inner::Integer(file) => file.len(),
        }
    }

    /// Whether the file is empty
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records whose key equals `query`, in file order.
    ///
    /// Fails with [`SearchError::InvalidQuery`] if the key's mode differs from
    /// the scanner's, and with [`SearchError::NotFound`] if no line matches.
    pub fn search(&self, query: impl Into<Key>) -> Result<Vec<Record<Key>>> {
        with_typed_query!(&self.inner, query.into(), |file, query| {
            Ok(file
                .search(&query)?
                .into_iter()
                .map(Record::into_dynamic)
                .collect())
        })
    }

    /// Offset of the first line whose key equals `query`.
    pub fn first_offset(&self, query: impl Into<Key>) -> Result<u64> {
        with_typed_query!(&self.inner, query.into(), |file, query| {
            file.first_offset(&query)
        })
    }

    /// Whether any line carries `query`.
    pub fn contains(&self, query: impl Into<Key>) -> Result<bool> {
        with_typed_query!(&self.inner, query.into(), |file, query| {
            file.contains(&query)
        })
    }

    /// Number of lines carrying `query`.
    pub fn count(&self, query: impl Into<Key>) -> Result<usize> {
        with_typed_query!(&self.inner, query.into(), |file, query| {
            file.count(&query)
        })
    }

    /// Whether keys are non-decreasing throughout the file.
    pub fn is_sorted(&self) -> bool {
        match &self.inner {
            Inner::Text(file) => file.is_sorted(),
            Inner::Integer(file) => file.is_sorted(),
        }
    }

    /// First out-of-order pair of lines, if any.
    pub fn check_sorted(&self) -> Result<Option<SortViolation>> {
        match &self.inner {
            Inner::Text(file) => file.check_sorted(),
            Inner::Integer(file) => file.check_sorted(),
        }
    }
}
