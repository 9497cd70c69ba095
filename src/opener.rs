//! How the pool turns a path into a readable stream.
//!
//! The pool calls the opener while holding its lock, so an implementation
//! should do the minimum needed to obtain a stream and leave reading to the
//! caller of [`StreamPool::acquire`](crate::StreamPool::acquire).

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Boxed stream handed out inside a [`SourceHandle`](crate::SourceHandle).
pub type SourceReader = Box<dyn Read + Send>;

/// Strategy for opening regular files and named pipes.
pub trait SourceOpener: Send + Sync {
    /// Open a regular file for reading.
    fn open_file(&self, path: &Path) -> io::Result<SourceReader>;

    /// Open a named pipe for reading.
    ///
    /// Defaults to [`open_file`](Self::open_file). Opening a FIFO with no
    /// writer attached blocks until its generator opens the write end, and
    /// the pool lock is held for that whole time: every other `acquire` and
    /// every handle release on other threads waits with it. Override this to
    /// open FIFOs with `O_NONBLOCK` if generators may start late.
    fn open_pipe(&self, path: &Path) -> io::Result<SourceReader> {
        self.open_file(path)
    }
}

/// Opens sources straight from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOpener;

impl SourceOpener for FsOpener {
    fn open_file(&self, path: &Path) -> io::Result<SourceReader> {
        let file = File::open(path)?;
        Ok(Box::new(file))
    }
}

impl<F> SourceOpener for F
where
    F: Fn(&Path) -> io::Result<SourceReader> + Send + Sync,
{
    fn open_file(&self, path: &Path) -> io::Result<SourceReader> {
        self(path)
    }
}
