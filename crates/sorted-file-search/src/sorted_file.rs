//! Typed binary search over a sorted file

use crate::config::{SourceBackend, separator_byte};
use crate::error::Result;
use crate::key::{KeyMode, LineKey};
use crate::record::Record;
use crate::search::{SearchContext, collect_run, locate};
use crate::sortedness::{SortViolation, first_violation};
use crate::source::{FileSource, ReadAt};
use std::marker::PhantomData;
use std::path::Path;
use tracing::{debug, warn};

/// A key-sorted file searched with keys of type `K`.
///
/// The key type fixes the comparison mode at compile time: `SortedFile<String>`
/// compares bytes, `SortedFile<i64>` compares numbers. The source length is
/// read once on attach and reused by every query.
///
/// All queries take `&self` and read through [`ReadAt`], so a `SortedFile`
/// over a `Sync` source can be shared between threads.
#[derive(Debug)]
pub struct SortedFile<K, S = FileSource> {
    source: S,
    len: u64,
    separator: u8,
    _key: PhantomData<fn() -> K>,
}

impl<K: LineKey> SortedFile<K, FileSource> {
    /// Open a file, memory-mapping it when possible.
    pub fn open(path: impl AsRef<Path>, separator: char) -> Result<Self> {
        Self::open_with(path, separator, SourceBackend::Auto)
    }

    /// Open a file with an explicit access backend.
    pub fn open_with(
        path: impl AsRef<Path>,
        separator: char,
        backend: SourceBackend,
    ) -> Result<Self> {
        // Validate before touching the filesystem
        separator_byte(separator)?;
        let source = FileSource::open(path.as_ref(), backend)?;
        Self::new(source, separator)
    }
}

impl<K: LineKey, S: ReadAt> SortedFile<K, S> {
    /// Attach to a source, caching its length.
    pub fn new(source: S, separator: char) -> Result<Self> {
        let separator = separator_byte(separator)?;
        let len = source.size()?;

        debug!(
            "Attached {} keyed source (size: {} bytes, separator: {:?})",
            K::MODE,
            len,
            separator as char
        );

        Ok(Self {
            source,
            len,
            separator,
            _key: PhantomData,
        })
    }

    /// Replace the source and recompute the cached length.
    pub fn reattach(&mut self, source: S) -> Result<()> {
        let len = source.size()?;
        debug!("Reattached {} keyed source (size: {} bytes)", K::MODE, len);
        self.source = source;
        self.len = len;
        Ok(())
    }

    /// Detach and return the underlying source
    pub fn into_source(self) -> S {
        self.source
    }

    /// Underlying source
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Source length in bytes, as cached on attach
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Whether the source is empty
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Field separator
    pub const fn separator(&self) -> char {
        self.separator as char
    }

    /// Key comparison mode
    pub const fn mode(&self) -> KeyMode {
        K::MODE
    }

    fn context(&self) -> SearchContext<'_, S> {
        SearchContext::new(&self.source, self.len, self.separator)
    }

    /// Offset of the first line whose key equals `query`.
    pub fn first_offset(&self, query: &K) -> Result<u64> {
        locate(&self.context(), query)
    }

    /// All records whose key equals `query`, in file order.
    ///
    /// Returns [`SearchError::NotFound`](crate::SearchError::NotFound) when no
    /// line carries the key. Never returns an empty vector.
    pub fn search(&self, query: &K) -> Result<Vec<Record<K>>> {
        let ctx = self.context();
        let first = locate(&ctx, query)?;
        let records = collect_run(&ctx, query, first)?;

        debug!(
            "Found {} records for {} at offset {}",
            records.len(),
            query,
            first
        );
        Ok(records)
    }

    /// Whether any line carries `query`.
    pub fn contains(&self, query: &K) -> Result<bool> {
        match self.first_offset(query) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Number of lines carrying `query`, zero when absent.
    pub fn count(&self, query: &K) -> Result<usize> {
        match self.search(query) {
            Ok(records) => Ok(records.len()),
            Err(e) if e.is_not_found() => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Scan the whole file for the first out-of-order pair of lines.
    ///
    /// This reads every line; run it once up front, not per query.
    pub fn check_sorted(&self) -> Result<Option<SortViolation>> {
        first_violation::<K, _>(&self.context().lines, self.separator)
    }

    /// Whether keys are non-decreasing throughout the file.
    ///
    /// A file that cannot be read or parsed to the end is reported as not
    /// sorted. Use [`check_sorted`](Self::check_sorted) for details.
    pub fn is_sorted(&self) -> bool {
        match self.check_sorted() {
            Ok(None) => true,
            Ok(Some(violation)) => {
                warn!("File is not sorted: {}", violation);
                false
            }
            Err(e) => {
                warn!("Could not verify sort order: {}", e);
                false
            }
        }
    }
}
