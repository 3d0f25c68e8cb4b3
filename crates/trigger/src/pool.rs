//! Pool of reusable byte buffers shared by trigger sessions.

use crate::sync::{Mutex, lock};
use std::sync::{Arc, OnceLock};

/// Idle buffers kept by default.
pub const DEFAULT_MAX_IDLE: usize = 64;
/// Buffers that grew beyond this capacity are dropped instead of pooled.
pub const DEFAULT_MAX_RETAINED_BYTES: usize = 64 * 1024;

/// A pool of byte buffers with concurrent acquire/release.
///
/// A buffer handed out by [`BufferPool::acquire`] is owned by the caller
/// until it is passed back to [`BufferPool::release`].
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<Vec<u8>>>,
    max_idle: usize,
    max_retained_bytes: usize,
}

impl BufferPool {
    /// Create a pool with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_IDLE, DEFAULT_MAX_RETAINED_BYTES)
    }

    /// Create a pool keeping at most `max_idle` buffers of at most
    /// `max_retained_bytes` capacity each.
    #[must_use]
    pub fn with_limits(max_idle: usize, max_retained_bytes: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
            max_retained_bytes,
        }
    }

    /// Process-wide pool used by sessions created without an explicit pool.
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<BufferPool>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    /// Take an empty buffer, reusing an idle one when available.
    pub fn acquire(&self) -> Vec<u8> {
        lock(&self.idle).pop().unwrap_or_default()
    }

    /// Return a buffer. Its contents are discarded.
    pub fn release(&self, mut buffer: Vec<u8>) {
        if buffer.capacity() > self.max_retained_bytes {
            return;
        }
        buffer.clear();

        let mut idle = lock(&self.idle);
        if idle.len() < self.max_idle {
            idle.push(buffer);
        }
    }

    /// Number of idle buffers currently pooled.
    pub fn idle(&self) -> usize {
        lock(&self.idle).len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}
