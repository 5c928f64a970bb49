//! Random-access byte sources
//!
//! Searches never rely on a shared seek cursor. Every read names its own
//! offset through [`ReadAt`], so a scanner holds no position state between
//! (or during) queries.

use crate::config::SourceBackend;
use crate::error::{Result, SearchError};
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Positional read access to a fixed-length byte source.
pub trait ReadAt {
    /// Total length of the source in bytes
    fn size(&self) -> io::Result<u64>;

    /// Read into `buf` starting at `offset`, returning the number of bytes read.
    ///
    /// Returns `Ok(0)` at or past the end of the source. Short reads are
    /// allowed.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Fill `buf` completely from `offset`.
    fn read_exact_at(&self, mut offset: u64, mut buf: &mut [u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.read_at(offset, buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("source ended at offset {offset}"),
                    ));
                }
                Ok(n) => {
                    offset += n as u64;
                    buf = &mut buf[n..];
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl ReadAt for [u8] {
    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        if start >= self.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }
}

impl ReadAt for Vec<u8> {
    fn size(&self) -> io::Result<u64> {
        self.as_slice().size()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.as_slice().read_at(offset, buf)
    }
}

impl ReadAt for Mmap {
    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self[..].read_at(offset, buf)
    }
}

impl ReadAt for File {
    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    #[cfg(unix)]
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, offset)
    }
}

impl<T: ReadAt + ?Sized> ReadAt for &T {
    fn size(&self) -> io::Result<u64> {
        (**self).size()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(offset, buf)
    }
}

/// A file opened for searching, either memory-mapped or read positionally.
#[derive(Debug)]
pub enum FileSource {
    /// Memory-mapped file contents
    Mapped(Mmap),
    /// Plain file handle using positional reads
    Direct(File),
}

impl FileSource {
    /// Open `path` with the requested backend.
    ///
    /// [`SourceBackend::Auto`] maps non-empty files and falls back to direct
    /// reads when mapping fails. [`SourceBackend::Mmap`] reports the mapping
    /// failure instead.
    pub fn open(path: &Path, backend: SourceBackend) -> Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();

        let source = match backend {
            SourceBackend::File => Self::Direct(file),
            // Zero-length mappings are rejected on most platforms
            SourceBackend::Auto if size == 0 => Self::Direct(file),
            SourceBackend::Auto => match map_file(&file) {
                Ok(mmap) => Self::Mapped(mmap),
                Err(e) => {
                    warn!(
                        "Failed to memory-map {:?}, using positional reads: {}",
                        path, e
                    );
                    Self::Direct(file)
                }
            },
            SourceBackend::Mmap => {
                if size == 0 {
                    return Err(SearchError::Config(format!(
                        "cannot memory-map empty file {}",
                        path.display()
                    )));
                }
                Self::Mapped(map_file(&file)?)
            }
        };

        debug!(
            "Opened {:?} (size: {} bytes, mapped: {})",
            path,
            size,
            source.is_mapped()
        );

        Ok(source)
    }

    /// Whether the contents are memory-mapped
    pub const fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }
}

impl ReadAt for FileSource {
    fn size(&self) -> io::Result<u64> {
        match self {
            Self::Mapped(mmap) => mmap.size(),
            Self::Direct(file) => file.size(),
        }
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Mapped(mmap) => mmap.read_at(offset, buf),
            Self::Direct(file) => file.read_at(offset, buf),
        }
    }
}

#[allow(unsafe_code)]
fn map_file(file: &File) -> io::Result<Mmap> {
    // SAFETY: the mapping is read-only. The file must not be truncated while
    // mapped, the same requirement the search has on the file's contents.
    unsafe { MmapOptions::new().map(file) }
}
