//! Synchronization primitives used for pool state.
//!
//! Under `cfg(loom)` these resolve to loom's model-checked versions so the
//! acquire/release protocol can be explored exhaustively.

#[cfg(loom)]
pub(crate) use loom::sync::{Arc, Mutex, MutexGuard};

#[cfg(not(loom))]
pub(crate) use std::sync::{Arc, Mutex, MutexGuard};
