//! Line boundary discovery over a [`ReadAt`] source
//!
//! Lines are terminated by `\n`. The final line may be unterminated. A `\r`
//! directly before the terminator is not part of the line content.

use crate::source::ReadAt;
use std::io;

/// Bytes read per backward or forward step
pub(crate) const WINDOW_SIZE: usize = 4096;

/// A line read from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    /// Offset of the first byte of the line
    pub start: u64,
    /// Line content without terminator
    pub content: Vec<u8>,
}

/// Line-oriented view of a source with a known length.
pub(crate) struct Lines<'a, S: ?Sized> {
    source: &'a S,
    len: u64,
}

impl<'a, S: ReadAt + ?Sized> Lines<'a, S> {
    pub(crate) const fn new(source: &'a S, len: u64) -> Self {
        Self { source, len }
    }

    /// Length of the underlying source
    pub(crate) const fn source_len(&self) -> u64 {
        self.len
    }

    /// Start of the line containing byte `pos`.
    ///
    /// The newline at `pos` itself belongs to the line it terminates, so the
    /// scan looks at bytes strictly before `pos`.
    pub(crate) fn line_start(&self, pos: u64) -> io::Result<u64> {
        let mut end = pos.min(self.len);
        let mut window = [0u8; WINDOW_SIZE];

        while end > 0 {
            let start = end.saturating_sub(WINDOW_SIZE as u64);
            let chunk = &mut window[..(end - start) as usize];
            self.source.read_exact_at(start, chunk)?;

            if let Some(i) = chunk.iter().rposition(|&b| b == b'\n') {
                return Ok(start + i as u64 + 1);
            }
            end = start;
        }

        Ok(0)
    }

    /// Start of the line before the one starting at `start`, if any.
    pub(crate) fn previous_line_start(&self, start: u64) -> io::Result<Option<u64>> {
        if start == 0 {
            return Ok(None);
        }
        self.line_start(start - 1).map(Some)
    }

    /// Key bytes of the line starting at `start`, or `None` at end of source.
    ///
    /// Reading stops at the first `separator` or at the end of the line, so
    /// the fields after the key are never read.
    pub(crate) fn read_key_field(&self, start: u64, separator: u8) -> io::Result<Option<Vec<u8>>> {
        if start >= self.len {
            return Ok(None);
        }

        let mut window = [0u8; WINDOW_SIZE];
        let mut key = Vec::new();
        let mut offset = start;

        while offset < self.len {
            let want = (self.len - offset).min(WINDOW_SIZE as u64) as usize;
            let chunk = &mut window[..want];
            self.source.read_exact_at(offset, chunk)?;

            if let Some(i) = chunk.iter().position(|&b| b == separator || b == b'\n') {
                key.extend_from_slice(&chunk[..i]);
                if chunk[i] == separator {
                    return Ok(Some(key));
                }
                break;
            }
            key.extend_from_slice(chunk);
            offset += want as u64;
        }

        // The line ended without a separator
        if key.last() == Some(&b'\r') {
            key.pop();
        }
        Ok(Some(key))
    }

    /// Read the line starting at `start`, or `None` at end of source.
    pub(crate) fn read_line(&self, start: u64) -> io::Result<Option<Line>> {
        self.iter_from(start).next().transpose()
    }

    /// Iterate lines sequentially from `start`, which must be a line start.
    pub(crate) const fn iter_from(&self, start: u64) -> LineIter<'a, S> {
        LineIter {
            source: self.source,
            len: self.len,
            offset: start,
            pending: Vec::new(),
        }
    }
}

/// Sequential line reader that buffers whole windows.
pub(crate) struct LineIter<'a, S: ?Sized> {
    source: &'a S,
    len: u64,
    /// Start of the next line to yield
    offset: u64,
    /// Bytes already read from `offset` onward
    pending: Vec<u8>,
}

impl<S: ReadAt + ?Sized> LineIter<'_, S> {
    fn next_line(&mut self) -> io::Result<Option<Line>> {
        if self.offset >= self.len {
            return Ok(None);
        }

        let mut searched = 0;
        loop {
            if let Some(i) = self.pending[searched..].iter().position(|&b| b == b'\n') {
                let end = searched + i;
                let mut content: Vec<u8> = self.pending.drain(..=end).collect();
                content.pop();
                return Ok(Some(self.finish_line(content, end as u64 + 1)));
            }
            searched = self.pending.len();

            let read_pos = self.offset + self.pending.len() as u64;
            if read_pos >= self.len {
                // Unterminated final line
                let content = std::mem::take(&mut self.pending);
                let consumed = content.len() as u64;
                return Ok(Some(self.finish_line(content, consumed)));
            }

            let want = (self.len - read_pos).min(WINDOW_SIZE as u64) as usize;
            let filled = self.pending.len();
            self.pending.resize(filled + want, 0);
            self.source
                .read_exact_at(read_pos, &mut self.pending[filled..])?;
        }
    }

    fn finish_line(&mut self, mut content: Vec<u8>, consumed: u64) -> Line {
        if content.last() == Some(&b'\r') {
            content.pop();
        }
        let start = self.offset;
        self.offset += consumed;
        Line { start, content }
    }
}

impl<S: ReadAt + ?Sized> Iterator for LineIter<'_, S> {
    type Item = io::Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => None,
            Err(e) => {
                // Stop after the first error
                self.offset = self.len;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn starts(data: &[u8]) -> Vec<u64> {
        let lines = Lines::new(data, data.len() as u64);
        (0..data.len() as u64)
            .map(|pos| lines.line_start(pos).unwrap())
            .collect()
    }

    #[test]
    fn test_line_start_snaps_backward() {
        // "ab\ncd\n" -> lines at 0 and 3, newlines belong to their line
        assert_eq!(starts(b"ab\ncd\n"), vec![0, 0, 0, 3, 3, 3]);
        assert_eq!(starts(b"x"), vec![0]);
        assert_eq!(starts(b"\n\n"), vec![0, 1]);
    }

    #[test]
    fn test_line_start_across_windows() {
        let mut data = vec![b'a'; WINDOW_SIZE * 2 + 10];
        data[5] = b'\n';
        let lines = Lines::new(data.as_slice(), data.len() as u64);

        assert_eq!(lines.line_start(data.len() as u64 - 1).unwrap(), 6);
        assert_eq!(lines.line_start(5).unwrap(), 0);
        assert_eq!(lines.line_start(6).unwrap(), 6);
        assert_eq!(lines.previous_line_start(6).unwrap(), Some(0));
        assert_eq!(lines.previous_line_start(0).unwrap(), None);
    }

    #[test]
    fn test_iterate_lines() {
        let data: &[u8] = b"aa\tfirst\r\nbb\tsecond\n\ncc";
        let lines = Lines::new(data, data.len() as u64);
        let all: Vec<Line> = lines.iter_from(0).map(Result::unwrap).collect();

        let offsets: Vec<u64> = all.iter().map(|line| line.start).collect();
        assert_eq!(offsets, vec![0, 10, 20, 21]);
        assert_eq!(all[0].content, b"aa\tfirst");
        assert_eq!(all[1].content, b"bb\tsecond");
        assert_eq!(all[2].content, b"");
        assert_eq!(all[3].content, b"cc");
    }

    #[test]
    fn test_trailing_newline_has_no_phantom_line() {
        let data: &[u8] = b"a\nb\n";
        let lines = Lines::new(data, data.len() as u64);
        assert_eq!(lines.iter_from(0).count(), 2);
        assert_eq!(lines.read_line(4).unwrap(), None);
    }

    #[test]
    fn test_long_line_spans_windows() {
        let mut data = vec![b'k'; WINDOW_SIZE * 3];
        data.extend_from_slice(b"\nnext");
        let lines = Lines::new(data.as_slice(), data.len() as u64);

        let first = lines.read_line(0).unwrap().unwrap();
        assert_eq!(first.content.len(), WINDOW_SIZE * 3);

        let second_start = WINDOW_SIZE as u64 * 3 + 1;
        let second = lines.read_line(second_start).unwrap().unwrap();
        assert_eq!(second.start, second_start);
        assert_eq!(second.content, b"next");
        assert_eq!(lines.read_line(data.len() as u64).unwrap(), None);
    }

    /// Source that fails any read reaching past `readable` bytes
    struct PrefixOnly {
        data: Vec<u8>,
        readable: u64,
    }

    impl ReadAt for PrefixOnly {
        fn size(&self) -> io::Result<u64> {
            self.data.size()
        }

        fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
            if offset + buf.len() as u64 > self.readable {
                return Err(io::Error::other("read past the key"));
            }
            self.data.read_at(offset, buf)
        }
    }

    #[test]
    fn test_read_key_field_stops_at_separator() {
        let mut data = b"key\t".to_vec();
        data.extend(vec![b'p'; WINDOW_SIZE * 4]);
        data.push(b'\n');
        let source = PrefixOnly {
            data,
            readable: WINDOW_SIZE as u64,
        };
        let lines = Lines::new(&source, source.data.len() as u64);

        assert_eq!(lines.read_key_field(0, b'\t').unwrap().unwrap(), b"key");
        assert!(lines.read_line(0).is_err());
    }

    #[test]
    fn test_read_key_field_line_endings() {
        let data: &[u8] = b"a,1\r\nbare\r\n\nlast\r";
        let lines = Lines::new(data, data.len() as u64);

        assert_eq!(lines.read_key_field(0, b',').unwrap().unwrap(), b"a");
        assert_eq!(lines.read_key_field(5, b',').unwrap().unwrap(), b"bare");
        assert_eq!(lines.read_key_field(11, b',').unwrap().unwrap(), b"");
        assert_eq!(lines.read_key_field(12, b',').unwrap().unwrap(), b"last");
        let end = data.len() as u64;
        assert!(lines.read_key_field(end, b',').unwrap().is_none());
    }

    #[test]
    fn test_read_key_field_longer_than_window() {
        let mut data = vec![b'k'; WINDOW_SIZE + 7];
        data.extend_from_slice(b"\tvalue\n");
        let lines = Lines::new(data.as_slice(), data.len() as u64);

        let key = lines.read_key_field(0, b'\t').unwrap().unwrap();
        assert_eq!(key.len(), WINDOW_SIZE + 7);
        assert!(key.iter().all(|&b| b == b'k'));
    }
}
