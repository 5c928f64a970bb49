//! Backward walk to the first line of a duplicate-key run

use super::SearchContext;
use crate::error::Result;
use crate::key::LineKey;
use crate::source::ReadAt;
use tracing::trace;

/// Walk back from `start`, a line known to carry `query`, to the first line of
/// the run.
///
/// This is linear in the number of duplicates preceding `start`: files with
/// very long runs of one key pay one backward line read per duplicate.
pub(crate) fn first_occurrence<K, S>(
    ctx: &SearchContext<'_, S>,
    query: &K,
    mut start: u64,
) -> Result<u64>
where
    K: LineKey,
    S: ReadAt + ?Sized,
{
    let mut steps = 0u64;

    while let Some(previous) = ctx.lines.previous_line_start(start)? {
        let key: K = ctx.read_key(previous)?;
        if key != *query {
            break;
        }
        start = previous;
        steps += 1;
    }

    trace!("Walked back {} lines to offset {}", steps, start);
    Ok(start)
}
