//! Pool statistics and monitoring.

/// Point-in-time snapshot of a [`StreamPool`](super::StreamPool).
///
/// Captured under the pool lock, so the fields are mutually consistent, but
/// they go stale as soon as other threads acquire or release.
///
/// # Examples
///
/// ```rust
/// use stream_pool::StreamPool;
///
/// let pool = StreamPool::new(["reads_1.fa", "reads_2.fa"], 2);
/// let stats = pool.stats().unwrap();
///
/// assert_eq!(stats.files_remaining, 2);
/// assert_eq!(stats.file_slots_available(), 2);
/// assert!(!stats.is_exhausted());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Cap on concurrently open regular files
    pub concurrent_files: usize,
    /// Regular files currently open through the pool
    pub files_open: usize,
    /// File paths not yet attempted
    pub files_remaining: usize,
    /// File handles issued since pool creation
    pub files_issued: u64,
    /// File paths skipped because they failed to open
    pub files_skipped: u64,
    /// Pipes waiting to be opened
    pub free_pipes: usize,
    /// Pipes currently owned by a handle
    pub busy_pipes: usize,
    /// Pipe handles issued since pool creation
    pub pipes_issued: u64,
    /// Pipes permanently dropped because they failed to open
    pub pipes_dropped: u64,
    /// Acquisitions that returned no handle
    pub empty_acquires: u64,
}

impl PoolStats {
    /// True once no source can ever be handed out again.
    ///
    /// Open files do not count: a released file never returns to the pool.
    ///
    /// ```rust
    /// # use stream_pool::PoolStats;
    /// let stats = PoolStats {
    ///     concurrent_files: 1,
    ///     files_open: 1,
    ///     files_remaining: 0,
    ///     free_pipes: 0,
    ///     busy_pipes: 0,
    ///     # files_issued: 3, files_skipped: 0, pipes_issued: 0,
    ///     # pipes_dropped: 0, empty_acquires: 0,
    /// };
    /// assert!(stats.is_exhausted());
    /// ```
    pub fn is_exhausted(&self) -> bool {
        self.files_remaining == 0 && self.free_pipes == 0 && self.busy_pipes == 0
    }

    /// How many more files could be opened right now.
    pub fn file_slots_available(&self) -> usize {
        self.concurrent_files.saturating_sub(self.files_open)
    }

    /// Fraction of the file cap in use (0.0 to 1.0).
    ///
    /// A pool with a zero cap reports 0.0.
    pub fn file_utilization(&self) -> f64 {
        if self.concurrent_files == 0 {
            0.0
        } else {
            self.files_open as f64 / self.concurrent_files as f64
        }
    }

    /// Total pipes still known to the pool.
    pub fn live_pipes(&self) -> usize {
        self.free_pipes + self.busy_pipes
    }

    /// Check if any file was skipped or pipe dropped.
    pub fn has_open_failures(&self) -> bool {
        self.files_skipped > 0 || self.pipes_dropped > 0
    }
}
