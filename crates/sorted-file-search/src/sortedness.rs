//! Sort order verification
//!
//! Binary search silently returns wrong answers on unsorted input, so callers
//! can check a file once before trusting lookups on it. The check reads every
//! line and is never run as part of a search.

use crate::error::{Result, SearchError};
use crate::key::LineKey;
use crate::lines::Lines;
use crate::record::key_field;
use crate::source::ReadAt;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// First adjacent pair of lines found out of order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortViolation {
    /// 1-based line number of the offending line
    pub line_number: u64,
    /// Byte offset of the offending line
    pub offset: u64,
    /// Key of the preceding line
    pub previous: String,
    /// Key of the offending line, which sorts before `previous`
    pub current: String,
}

impl fmt::Display for SortViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {} (offset {}): key {:?} sorts before preceding key {:?}",
            self.line_number, self.offset, self.current, self.previous
        )
    }
}

/// Scan `lines` from the start and report the first key that decreases.
pub(crate) fn first_violation<K, S>(
    lines: &Lines<'_, S>,
    separator: u8,
) -> Result<Option<SortViolation>>
where
    K: LineKey,
    S: ReadAt + ?Sized,
{
    let mut previous: Option<K> = None;
    let mut line_number = 0u64;

    for line in lines.iter_from(0) {
        let line = line?;
        line_number += 1;

        let key = K::parse_key(key_field(&line.content, separator))
            .map_err(|reason| SearchError::malformed(line.start, reason))?;

        if let Some(prev) = &previous
            && key < *prev
        {
            return Ok(Some(SortViolation {
                line_number,
                offset: line.start,
                previous: prev.to_string(),
                current: key.to_string(),
            }));
        }
        previous = Some(key);
    }

    debug!("Checked {} lines, keys are non-decreasing", line_number);
    Ok(None)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn check<K: LineKey>(data: &[u8], separator: u8) -> Result<Option<SortViolation>> {
        let lines = Lines::new(data, data.len() as u64);
        first_violation::<K, _>(&lines, separator)
    }

    #[test]
    fn test_sorted_text() {
        let data = b"aa\tfirst\naaA\tsecond\naaa\tthird\nbA\tfourth_1\nbA\tfourth_2\nzz\tlast\n";
        assert_eq!(check::<String>(data, b'\t').unwrap(), None);
    }

    #[test]
    fn test_unsorted_text() {
        let data = b"aa\t1\nb\t2\nab\t3\n";
        let violation = check::<String>(data, b'\t').unwrap().unwrap();
        assert_eq!(violation.line_number, 3);
        assert_eq!(violation.offset, 9);
        assert_eq!(violation.previous, "b");
        assert_eq!(violation.current, "ab");
        assert_eq!(
            violation.to_string(),
            "line 3 (offset 9): key \"ab\" sorts before preceding key \"b\""
        );
    }

    #[test]
    fn test_integer_order_is_numeric() {
        // Sorted numerically but not lexicographically
        let data = b"2,two\n10,ten\n10,zehn\n-1,bad";
        let violation = check::<i64>(b"2,two\n10,ten\n10,zehn\n", b',').unwrap();
        assert_eq!(violation, None);

        let violation = check::<i64>(data, b',').unwrap().unwrap();
        assert_eq!(violation.line_number, 4);
        assert_eq!(violation.current, "-1");

        // The same lines in text mode are out of order at line 2
        let violation = check::<String>(data, b',').unwrap().unwrap();
        assert_eq!(violation.line_number, 2);
    }

    #[test]
    fn test_empty_and_single_line() {
        assert_eq!(check::<String>(b"", b'\t').unwrap(), None);
        assert_eq!(check::<i64>(b"7", b'\t').unwrap(), None);
    }

    #[test]
    fn test_malformed_integer_fails() {
        let err = check::<i64>(b"1,one\nx,bad\n", b',').unwrap_err();
        assert!(matches!(err, SearchError::MalformedFile { offset: 6, .. }));
    }
}
