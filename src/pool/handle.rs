//! RAII wrapper for streams handed out by the pool.

use std::fmt;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::opener::SourceReader;
use crate::sync::{Arc, Mutex};

use super::PoolInner;

/// Where a [`SourceHandle`] reads from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    /// A regular file, counted against the pool's file cap.
    File(PathBuf),
    /// A named pipe, returned to the free queue on release.
    Pipe(PathBuf),
}

impl Source {
    /// Path of the underlying file or pipe.
    pub fn path(&self) -> &Path {
        match self {
            Source::File(path) | Source::Pipe(path) => path,
        }
    }

    /// True for a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, Source::File(_))
    }

    /// True for a named pipe.
    pub fn is_pipe(&self) -> bool {
        matches!(self, Source::Pipe(_))
    }
}

/// A stream borrowed from a [`StreamPool`](super::StreamPool) that releases
/// its slot on drop.
///
/// Provides RAII semantics: the file slot or pipe goes back to the pool
/// exactly once, whether the handle is dropped after normal use, during
/// unwinding, or through an explicit [`close`](Self::close). The stream itself
/// is closed before the pool is notified.
pub struct SourceHandle {
    /// The open stream (None once released)
    reader: Option<BufReader<SourceReader>>,
    source: Source,
    /// Pool state to notify on release
    pool: Arc<Mutex<PoolInner>>,
}

impl SourceHandle {
    pub(super) fn new(source: Source, reader: SourceReader, pool: Arc<Mutex<PoolInner>>) -> Self {
        Self {
            reader: Some(BufReader::new(reader)),
            source,
            pool,
        }
    }

    /// What this handle reads from.
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Path of the underlying file or pipe.
    pub fn path(&self) -> &Path {
        self.source.path()
    }

    /// True if the handle reads a regular file.
    pub fn is_file(&self) -> bool {
        self.source.is_file()
    }

    /// True if the handle reads a named pipe.
    pub fn is_pipe(&self) -> bool {
        self.source.is_pipe()
    }

    /// Close the stream and hand the source back to the pool now.
    ///
    /// Equivalent to dropping the handle. The handle is consumed, so it
    /// cannot be closed twice:
    ///
    /// ```compile_fail
    /// # let pool = stream_pool::StreamPool::new(["reads.fa"], 1);
    /// let handle = pool.acquire().unwrap();
    /// handle.close();
    /// handle.close();
    /// ```
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        // Taking the reader is what makes the release one-shot.
        let Some(reader) = self.reader.take() else {
            return;
        };
        drop(reader);

        match &self.source {
            Source::File(_) => super::release_file(&self.pool),
            Source::Pipe(path) => super::release_pipe(&self.pool, path),
        }
    }

    fn reader_mut(&mut self) -> io::Result<&mut BufReader<SourceReader>> {
        self.reader
            .as_mut()
            .ok_or_else(|| io::Error::other("source handle already released"))
    }
}

impl Read for SourceHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader_mut()?.read(buf)
    }
}

impl BufRead for SourceHandle {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.reader_mut()?.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        if let Some(reader) = self.reader.as_mut() {
            reader.consume(amt);
        }
    }
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceHandle")
            .field("source", &self.source)
            .field("open", &self.reader.is_some())
            .finish()
    }
}

// Workers may finish with a handle on a different thread than the one that
// acquired it.
static_assertions::assert_impl_all!(SourceHandle: Send);
