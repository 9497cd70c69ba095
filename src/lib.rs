//! # stream-pool: shared input sources for worker threads
//!
//! A bounded, thread-safe pool that hands out input streams to a fixed set of
//! worker threads. Streams come from two pools:
//!
//! - **Regular files**: an ordered list, each file read once, with a cap on
//!   how many may be open at the same time.
//! - **Named pipes**: endpoints fed by long-running generator processes. A
//!   pipe is owned by one reader at a time and becomes available again once
//!   that reader is done with it.
//!
//! Workers call [`StreamPool::acquire`] and get back a [`SourceHandle`]. They
//! do not need to know which kind of source they received: the handle reads
//! like any buffered stream and gives its file slot or pipe back to the pool
//! when dropped.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::io::Read;
//! use stream_pool::StreamPool;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let dir = tempfile::tempdir()?;
//! # let a = dir.path().join("a.fa");
//! # let b = dir.path().join("b.fa");
//! # std::fs::write(&a, ">a\nACGT\n")?;
//! # std::fs::write(&b, ">b\nTTGA\n")?;
//! let pool = StreamPool::new([&a, &b], 1);
//!
//! let mut first = pool.acquire().expect("a.fa opens");
//! // The file cap is 1, so nothing else is available until `first` is gone.
//! assert!(pool.acquire().is_none());
//!
//! let mut contents = String::new();
//! first.read_to_string(&mut contents)?;
//! drop(first);
//!
//! let second = pool.acquire().expect("b.fa opens");
//! assert_eq!(second.path(), b.as_path());
//! # Ok(())
//! # }
//! ```
//!
//! ## Telling "not now" from "never"
//!
//! [`StreamPool::acquire`] returns `None` both while every source is busy and
//! once the pool is drained. [`StreamPool::try_acquire`] separates the two:
//!
//! ```rust
//! use stream_pool::{Acquisition, StreamPool};
//!
//! let pool = StreamPool::new(Vec::<std::path::PathBuf>::new(), 1);
//! assert!(matches!(pool.try_acquire(), Ok(Acquisition::Exhausted)));
//! ```
//!
//! ## Failure handling
//!
//! Open failures never reach the caller. A file that cannot be opened is
//! skipped; a pipe that cannot be opened is dropped from the pool for good.
//! Both are reported through [`tracing`] at `warn` level; the crate does not
//! install a subscriber.

#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod opener;
pub mod pool;
mod sync;

pub use config::{ConfigBuilder, PoolConfig, DEFAULT_CONCURRENT_FILES};
pub use error::{Result, StreamPoolError};
pub use opener::{FsOpener, SourceOpener, SourceReader};
pub use pool::{Acquisition, PoolStats, Source, SourceHandle, StreamPool};
