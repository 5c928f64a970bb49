//! Byte-offset bisection

use super::SearchContext;
use super::walk::first_occurrence;
use crate::error::{Result, SearchError};
use crate::key::LineKey;
use crate::source::ReadAt;
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Find the offset of the first line whose key equals `query`.
///
/// Line lengths are unknown, so the search bisects the inclusive byte range
/// `[low, high]` and snaps every midpoint back to the start of the line that
/// contains it. Any line of a duplicate run is an acceptable hit; the walk back
/// to the run's first line happens afterwards.
pub(crate) fn locate<K, S>(ctx: &SearchContext<'_, S>, query: &K) -> Result<u64>
where
    K: LineKey,
    S: ReadAt + ?Sized,
{
    let not_found = || SearchError::NotFound(query.to_string());

    if ctx.lines.source_len() == 0 {
        return Err(not_found());
    }

    let mut low = 0u64;
    let mut high = ctx.lines.source_len() - 1;
    let mut probes = 0u32;

    while low <= high {
        let mid = low + (high - low) / 2;
        let line_start = ctx.lines.line_start(mid)?;
        let current: K = ctx.read_key(line_start)?;
        probes += 1;

        trace!(
            "Probe {}: range=[{}, {}] mid={} line_start={} key={}",
            probes, low, high, mid, line_start, current
        );

        match query.cmp(&current) {
            Ordering::Equal => {
                let first = first_occurrence(ctx, query, line_start)?;
                debug!(
                    "Located {} at offset {} after {} probes (hit at {})",
                    query, first, probes, line_start
                );
                return Ok(first);
            }
            Ordering::Less => {
                if mid == 0 {
                    break;
                }
                high = mid - 1;
            }
            Ordering::Greater => low = mid + 1,
        }
    }

    debug!("{} not found after {} probes", query, probes);
    Err(not_found())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const TEXT: &[u8] =
        b"aa\tfirst\naaA\tsecond\naaa\tthird\nbA\tfourth_1\nbA\tfourth_2\nzz\tlast\n";

    fn locate_text(data: &[u8], query: &str) -> Result<u64> {
        let ctx = SearchContext::new(data, data.len() as u64, b'\t');
        locate(&ctx, &query.to_string())
    }

    #[test]
    fn test_locate_first_offsets() {
        assert_eq!(locate_text(TEXT, "aa").unwrap(), 0);
        assert_eq!(locate_text(TEXT, "aaA").unwrap(), 9);
        assert_eq!(locate_text(TEXT, "aaa").unwrap(), 20);
        assert_eq!(locate_text(TEXT, "bA").unwrap(), 30);
        assert_eq!(locate_text(TEXT, "zz").unwrap(), 54);
    }

    #[test]
    fn test_locate_missing_keys() {
        for query in ["qq", "a", "aab", "b", "zzz", ""] {
            let err = locate_text(TEXT, query).unwrap_err();
            assert!(err.is_not_found(), "{query:?}: {err:?}");
        }
    }

    #[test]
    fn test_locate_empty_source() {
        assert!(locate_text(b"", "aa").unwrap_err().is_not_found());
    }

    #[test]
    fn test_locate_single_line_without_newline() {
        assert_eq!(locate_text(b"only\tline", "only").unwrap(), 0);
        let err = locate_text(b"only\tline", "other").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_locate_integers() {
        let data: &[u8] = b"-5,neg\n1,one\n3,three\n4,four\n1000000,million";
        let ctx = SearchContext::new(data, data.len() as u64, b',');

        assert_eq!(locate(&ctx, &-5i64).unwrap(), 0);
        assert_eq!(locate(&ctx, &4i64).unwrap(), 21);
        assert_eq!(locate(&ctx, &1_000_000i64).unwrap(), 28);
        assert!(locate(&ctx, &2i64).unwrap_err().is_not_found());
        assert!(locate(&ctx, &i64::MAX).unwrap_err().is_not_found());
    }
}
