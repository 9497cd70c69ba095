//! The pool itself: construction and acquisition.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::path::PathBuf;

use crate::config::PoolConfig;
use crate::error::{Result, StreamPoolError};
use crate::opener::{FsOpener, SourceOpener};
use crate::sync::{Arc, Mutex};

use super::{PoolInner, PoolStats, Source, SourceHandle};

/// Outcome of [`StreamPool::try_acquire`].
#[derive(Debug)]
pub enum Acquisition {
    /// A source was opened and is now owned by the caller.
    Ready(SourceHandle),
    /// Nothing can be opened right now, but a file slot or a busy pipe may
    /// come back once another thread releases its handle.
    Unavailable,
    /// Every file has been attempted and no pipe is left, free or busy.
    Exhausted,
}

impl Acquisition {
    /// The handle, if one was acquired.
    pub fn into_handle(self) -> Option<SourceHandle> {
        match self {
            Acquisition::Ready(handle) => Some(handle),
            Acquisition::Unavailable | Acquisition::Exhausted => None,
        }
    }

    /// True for [`Acquisition::Exhausted`].
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Acquisition::Exhausted)
    }
}

/// Thread-safe pool of input streams drawn from regular files and named
/// pipes.
///
/// Files are opened in order, at most `concurrent_files` at a time, and are
/// never handed out twice. Pipes are opened oldest-free first, are owned by a
/// single handle at a time, and go back to the free queue when that handle is
/// dropped. Regular files are preferred over pipes.
///
/// Calls never wait for a source to become available. Opening happens lazily
/// inside [`acquire`](Self::acquire), with the pool lock held.
///
/// ```rust,no_run
/// use std::io::BufRead;
/// use std::sync::Arc;
/// use std::thread;
///
/// use stream_pool::StreamPool;
///
/// let pool = Arc::new(StreamPool::with_pipes(
///     ["reads_1.fastq", "reads_2.fastq"],
///     ["/tmp/gen_0", "/tmp/gen_1"],
///     2,
/// ));
///
/// let workers: Vec<_> = (0..4)
///     .map(|_| {
///         let pool = Arc::clone(&pool);
///         thread::spawn(move || {
///             let mut lines = 0;
///             while let Some(handle) = pool.acquire() {
///                 lines += handle.lines().count();
///                 // handle dropped here, its source goes back to the pool
///             }
///             lines
///         })
///     })
///     .collect();
///
/// let total: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();
/// println!("read {total} lines");
/// ```
pub struct StreamPool {
    /// Shared state, also referenced by every live handle
    inner: Arc<Mutex<PoolInner>>,
    /// Cap on concurrently open regular files
    concurrent_files: usize,
    opener: Box<dyn SourceOpener>,
}

impl StreamPool {
    /// Create a pool over regular files only.
    ///
    /// No file is touched until the first acquisition.
    pub fn new<I, P>(paths: I, concurrent_files: usize) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::build(
            PoolConfig {
                concurrent_files,
                ..PoolConfig::files(paths)
            },
            Box::new(FsOpener),
        )
    }

    /// Create a pool over regular files and named pipes.
    pub fn with_pipes<I, P, J, Q>(paths: I, pipes: J, concurrent_files: usize) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
        J: IntoIterator<Item = Q>,
        Q: Into<PathBuf>,
    {
        Self::build(
            PoolConfig {
                paths: paths.into_iter().map(Into::into).collect(),
                pipes: pipes.into_iter().map(Into::into).collect(),
                concurrent_files,
            },
            Box::new(FsOpener),
        )
    }

    /// Create a pool from a validated configuration.
    pub fn from_config(config: PoolConfig) -> Result<Self> {
        Self::with_opener(config, FsOpener)
    }

    /// Create a pool that opens sources through a custom opener.
    pub fn with_opener(config: PoolConfig, opener: impl SourceOpener + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, Box::new(opener)))
    }

    fn build(config: PoolConfig, opener: Box<dyn SourceOpener>) -> Self {
        let mut seen = HashSet::with_capacity(config.pipes.len());
        let mut pipes = VecDeque::with_capacity(config.pipes.len());
        for pipe in config.pipes {
            if seen.insert(pipe.clone()) {
                pipes.push_back(pipe);
            } else {
                tracing::warn!(path = %pipe.display(), "duplicate pipe ignored");
            }
        }

        Self {
            inner: Arc::new(Mutex::new(PoolInner::new(config.paths, pipes))),
            concurrent_files: config.concurrent_files,
            opener,
        }
    }

    /// Cap on concurrently open regular files.
    pub fn concurrent_files(&self) -> usize {
        self.concurrent_files
    }

    /// Open the next available source.
    ///
    /// Returns `None` both when nothing is available right now and when the
    /// pool is exhausted; use [`try_acquire`](Self::try_acquire) to tell the
    /// two apart. A poisoned pool also yields `None`.
    pub fn acquire(&self) -> Option<SourceHandle> {
        self.try_acquire().ok().and_then(Acquisition::into_handle)
    }

    /// Open the next available source, distinguishing "not now" from "never".
    ///
    /// A regular file is tried first if the file cap allows it; files that
    /// fail to open are skipped for good. Otherwise free pipes are tried
    /// oldest first; a pipe that fails to open is dropped from the pool and
    /// never retried. Open failures are logged, not returned.
    pub fn try_acquire(&self) -> Result<Acquisition> {
        let mut inner = PoolInner::lock(&self.inner)?;

        if let Some(handle) = self.open_next_file(&mut inner) {
            return Ok(Acquisition::Ready(handle));
        }
        if let Some(handle) = self.open_next_pipe(&mut inner) {
            return Ok(Acquisition::Ready(handle));
        }

        inner.empty_acquires += 1;
        if inner.is_exhausted() {
            tracing::trace!("pool exhausted");
            Ok(Acquisition::Exhausted)
        } else {
            tracing::trace!(
                files_open = inner.files_open,
                busy_pipes = inner.busy_pipes.len(),
                "no source available"
            );
            Ok(Acquisition::Unavailable)
        }
    }

    fn open_next_file(&self, inner: &mut PoolInner) -> Option<SourceHandle> {
        if inner.files_open >= self.concurrent_files {
            return None;
        }

        for path in inner.paths.by_ref() {
            match self.opener.open_file(&path) {
                Ok(reader) => {
                    inner.files_open += 1;
                    inner.files_issued += 1;
                    tracing::debug!(
                        path = %path.display(),
                        files_open = inner.files_open,
                        "opened file"
                    );
                    return Some(SourceHandle::new(
                        Source::File(path),
                        reader,
                        Arc::clone(&self.inner),
                    ));
                }
                Err(source) => {
                    inner.files_skipped += 1;
                    let error = StreamPoolError::Open { path, source };
                    tracing::warn!(%error, "skipping file");
                }
            }
        }
        None
    }

    fn open_next_pipe(&self, inner: &mut PoolInner) -> Option<SourceHandle> {
        while let Some(path) = inner.free_pipes.pop_front() {
            match self.opener.open_pipe(&path) {
                Ok(reader) => {
                    inner.busy_pipes.insert(path.clone());
                    inner.pipes_issued += 1;
                    tracing::debug!(path = %path.display(), "opened pipe");
                    return Some(SourceHandle::new(
                        Source::Pipe(path),
                        reader,
                        Arc::clone(&self.inner),
                    ));
                }
                Err(source) => {
                    inner.pipes_dropped += 1;
                    let error = StreamPoolError::Open { path, source };
                    tracing::warn!(%error, "dropping pipe");
                }
            }
        }
        None
    }

    /// True once no source can ever be handed out again.
    pub fn is_exhausted(&self) -> Result<bool> {
        Ok(PoolInner::lock(&self.inner)?.is_exhausted())
    }

    /// Snapshot of the pool's counters.
    pub fn stats(&self) -> Result<PoolStats> {
        let inner = PoolInner::lock(&self.inner)?;
        Ok(PoolStats {
            concurrent_files: self.concurrent_files,
            files_open: inner.files_open,
            files_remaining: inner.paths.len(),
            files_issued: inner.files_issued,
            files_skipped: inner.files_skipped,
            free_pipes: inner.free_pipes.len(),
            busy_pipes: inner.busy_pipes.len(),
            pipes_issued: inner.pipes_issued,
            pipes_dropped: inner.pipes_dropped,
            empty_acquires: inner.empty_acquires,
        })
    }

    /// Free pipes in the order they will be tried, and busy pipes (unordered).
    pub fn pipe_sets(&self) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        let inner = PoolInner::lock(&self.inner)?;
        let free = inner.free_pipes.iter().cloned().collect();
        let busy = inner.busy_pipes.iter().cloned().collect();
        Ok((free, busy))
    }
}

impl fmt::Debug for StreamPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("StreamPool");
        s.field("concurrent_files", &self.concurrent_files);
        if let Ok(stats) = self.stats() {
            s.field("files_open", &stats.files_open)
                .field("files_remaining", &stats.files_remaining)
                .field("free_pipes", &stats.free_pipes)
                .field("busy_pipes", &stats.busy_pipes);
        }
        s.finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(StreamPool: Send, Sync);
