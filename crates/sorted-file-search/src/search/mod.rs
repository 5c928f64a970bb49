//! On-disk binary search over key-sorted lines
//!
//! A lookup runs in three stages:
//!
//! 1. [`locate`](locate::locate) bisects byte offsets until it lands on any
//!    line carrying the query key.
//! 2. [`first_occurrence`](walk::first_occurrence) walks back to the first
//!    line of that key's run.
//! 3. [`collect_run`](collect::collect_run) reads forward and parses every
//!    line of the run.
//!
//! Stages 1 and 2 cost O(log n) and O(duplicates before the match) line reads.

mod collect;
mod locate;
mod walk;

pub(crate) use collect::collect_run;
pub(crate) use locate::locate;

use crate::error::{Result, SearchError};
use crate::key::LineKey;
use crate::lines::Lines;
use crate::source::ReadAt;

/// Source, length and separator shared by the search stages.
pub(crate) struct SearchContext<'a, S: ?Sized> {
    pub(crate) lines: Lines<'a, S>,
    pub(crate) separator: u8,
}

impl<'a, S: ReadAt + ?Sized> SearchContext<'a, S> {
    pub(crate) const fn new(source: &'a S, len: u64, separator: u8) -> Self {
        Self {
            lines: Lines::new(source, len),
            separator,
        }
    }

    /// Parse the key of the line starting at `start`.
    ///
    /// Only the key is read; the rest of the line is skipped.
    pub(crate) fn read_key<K: LineKey>(&self, start: u64) -> Result<K> {
        let raw = self.lines.read_key_field(start, self.separator)?;
        let raw = raw.ok_or_else(|| {
            SearchError::InvariantViolation(format!("no line starts at offset {start}"))
        })?;

        K::parse_key(&raw).map_err(|reason| SearchError::malformed(start, reason))
    }
}
