//! Source pool handing out file and pipe streams to worker threads.
//!
//! All bookkeeping lives in [`PoolInner`] behind a single mutex. Acquisition
//! and the release fired by a dropped [`SourceHandle`] both take that lock, so
//! every pool operation is linearizable with respect to every other.

mod handle;
mod stats;
mod stream_pool;


pub use handle::{Source, SourceHandle};
pub use stats::PoolStats;
pub use stream_pool::{Acquisition, StreamPool};

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::error::{Result, StreamPoolError};
use crate::sync::{Arc, Mutex, MutexGuard};

/// Internal pool state protected by mutex for thread safety.
///
/// Only contains mutable state - the file cap and the opener are stored
/// directly in [`StreamPool`].
pub(crate) struct PoolInner {
    /// Remaining file paths; forward-only, never replenished
    pub(crate) paths: std::vec::IntoIter<PathBuf>,
    /// Number of file handles currently alive
    pub(crate) files_open: usize,
    /// Pipes available for opening - FIFO so the oldest freed pipe goes first
    pub(crate) free_pipes: VecDeque<PathBuf>,
    /// Pipes currently owned by a handle
    pub(crate) busy_pipes: HashSet<PathBuf>,
    /// File handles issued since creation
    pub(crate) files_issued: u64,
    /// File paths skipped because they failed to open
    pub(crate) files_skipped: u64,
    /// Pipe handles issued since creation
    pub(crate) pipes_issued: u64,
    /// Pipes permanently dropped because they failed to open
    pub(crate) pipes_dropped: u64,
    /// Acquisitions that produced no handle
    pub(crate) empty_acquires: u64,
}

impl PoolInner {
    pub(crate) fn new(paths: Vec<PathBuf>, pipes: VecDeque<PathBuf>) -> Self {
        Self {
            paths: paths.into_iter(),
            files_open: 0,
            free_pipes: pipes,
            busy_pipes: HashSet::new(),
            files_issued: 0,
            files_skipped: 0,
            pipes_issued: 0,
            pipes_dropped: 0,
            empty_acquires: 0,
        }
    }

    /// Helper to lock pool state with proper error handling.
    pub(crate) fn lock(inner: &Arc<Mutex<PoolInner>>) -> Result<MutexGuard<'_, PoolInner>> {
        inner.lock().map_err(|_| StreamPoolError::PoolPoisoned)
    }

    /// No file left to open and no pipe that could ever come back.
    pub(crate) fn is_exhausted(&self) -> bool {
        self.paths.as_slice().is_empty()
            && self.free_pipes.is_empty()
            && self.busy_pipes.is_empty()
    }

    fn release_file(&mut self) {
        self.files_open = self.files_open.saturating_sub(1);
    }

    /// Move `path` from busy back to the end of the free queue.
    ///
    /// Returns false, leaving both sets untouched, if `path` was not busy.
    fn release_pipe(&mut self, path: &Path) -> bool {
        if !self.busy_pipes.remove(path) {
            return false;
        }
        self.free_pipes.push_back(path.to_path_buf());
        true
    }
}

/// Give back a file slot. Called once per file handle, from its drop.
pub(crate) fn release_file(inner: &Arc<Mutex<PoolInner>>) {
    match PoolInner::lock(inner) {
        Ok(mut inner) => {
            inner.release_file();
            tracing::debug!(files_open = inner.files_open, "released file slot");
        }
        Err(e) => tracing::warn!(error = %e, "file slot not released"),
    }
}

/// Return a pipe to the free queue. Called once per pipe handle, from its drop.
pub(crate) fn release_pipe(inner: &Arc<Mutex<PoolInner>>, path: &Path) {
    match PoolInner::lock(inner) {
        Ok(mut inner) => {
            if inner.release_pipe(path) {
                tracing::debug!(path = %path.display(), "released pipe");
            } else {
                tracing::warn!(
                    path = %path.display(),
                    "released pipe was not busy, ignoring"
                );
            }
        }
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "pipe not released"),
    }
}
