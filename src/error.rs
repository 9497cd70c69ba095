//! Error types for stream pool operations.
//!
//! Open failures inside [`StreamPool::acquire`](crate::StreamPool::acquire)
//! are absorbed and logged as [`StreamPoolError::Open`]; callers only see "got
//! a source" or "nothing right now". The other variants surface from
//! configuration and from the lock guarding pool state.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for stream pool operations.
pub type Result<T> = std::result::Result<T, StreamPoolError>;

/// Error type for stream pool operations.
#[derive(Debug, Error)]
pub enum StreamPoolError {
    /// Pool state mutex is poisoned.
    ///
    /// A thread panicked while holding the pool lock (for example inside a
    /// custom opener). The bookkeeping can no longer be trusted.
    #[error("Stream pool mutex is poisoned")]
    PoolPoisoned,

    /// Configuration rejected by validation.
    #[error("Invalid pool configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected
        reason: String,
    },

    /// A source could not be opened.
    #[error("Can't open '{}': {source}", .path.display())]
    Open {
        /// Path of the file or pipe
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

impl StreamPoolError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

// Errors are produced on worker threads and may be handed to a coordinator.
static_assertions::assert_impl_all!(StreamPoolError: Send, Sync);
