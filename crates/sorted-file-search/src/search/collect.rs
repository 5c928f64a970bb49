//! Forward collection of a duplicate-key run

use super::SearchContext;
use crate::error::{Result, SearchError};
use crate::key::LineKey;
use crate::record::{Record, key_field, parse_fields};
use crate::source::ReadAt;

/// Parse every line of the run starting at `first`.
///
/// Stops at the first line with a different key or at the end of the source.
/// An empty run means `first` did not carry the key, which the bisection
/// guarantees it does.
pub(crate) fn collect_run<K, S>(
    ctx: &SearchContext<'_, S>,
    query: &K,
    first: u64,
) -> Result<Vec<Record<K>>>
where
    K: LineKey,
    S: ReadAt + ?Sized,
{
    let mut records = Vec::new();

    for line in ctx.lines.iter_from(first) {
        let line = line?;
        let key = K::parse_key(key_field(&line.content, ctx.separator))
            .map_err(|reason| SearchError::malformed(line.start, reason))?;
        if key != *query {
            break;
        }

        let fields = parse_fields(&line.content, ctx.separator)
            .map_err(|reason| SearchError::malformed(line.start, reason))?;
        records.push(Record::new(key, fields));
    }

    if records.is_empty() {
        return Err(SearchError::InvariantViolation(format!(
            "no records for {query} at offset {first}; is the file sorted?"
        )));
    }

    Ok(records)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_run_stops_at_key_change() {
        let data: &[u8] = b"bA\tfourth_1\nbA\tfourth_2\nzz\tlast\n";
        let ctx = SearchContext::new(data, data.len() as u64, b'\t');

        let records = collect_run(&ctx, &"bA".to_string(), 0).unwrap();
        assert_eq!(
            records,
            vec![
                Record::new("bA", ["fourth_1"]),
                Record::new("bA", ["fourth_2"]),
            ]
        );
    }

    #[test]
    fn test_collect_run_at_unterminated_end() {
        let data: &[u8] = b"3,three\n4,four\n4,vier";
        let ctx = SearchContext::new(data, data.len() as u64, b',');

        let records = collect_run(&ctx, &4i64, 8).unwrap();
        assert_eq!(
            records,
            vec![Record::new(4i64, ["four"]), Record::new(4i64, ["vier"])]
        );
    }

    #[test]
    fn test_collect_run_separator_only_last_line() {
        let data: &[u8] = b"a\tx\n\t";
        let ctx = SearchContext::new(data, data.len() as u64, b'\t');

        let records = collect_run(&ctx, &String::new(), 4).unwrap();
        assert_eq!(records, vec![Record::new("", [""])]);
    }

    #[test]
    fn test_collect_run_malformed_key() {
        let data: &[u8] = b"4,four\nfive,5\n";
        let ctx = SearchContext::new(data, data.len() as u64, b',');

        let err = collect_run(&ctx, &4i64, 0).unwrap_err();
        assert!(
            matches!(err, SearchError::MalformedFile { offset: 7, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn test_collect_run_empty_is_invariant_violation() {
        let data: &[u8] = b"a\t1\nb\t2\n";
        let ctx = SearchContext::new(data, data.len() as u64, b'\t');

        let err = collect_run(&ctx, &"b".to_string(), 0).unwrap_err();
        assert!(matches!(err, SearchError::InvariantViolation(_)), "{err:?}");
    }
}
