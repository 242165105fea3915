//! Optional pooling of reader buffers.
//!
//! Pooling changes how often buffers are allocated, never what the reader
//! produces. A buffer handed back through [`BufferPool::release`] is moved
//! into the pool, so the releasing reader cannot touch it again.

use alloc::vec::Vec;
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use tracing::debug;

pub trait BufferPool: Send + Sync {
    /// Returns a zero-initialised buffer of at least `min_len` bytes.
    fn rent(&self, min_len: usize) -> Vec<u8>;

    /// Takes a buffer back.
    fn release(&self, buffer: Vec<u8>);
}

/// A thread-safe pool that keeps released buffers for reuse.
#[derive(Debug, Default)]
pub struct SharedPool {
    free: Mutex<Vec<Vec<u8>>>,
    allocations: AtomicUsize,
    rents: AtomicUsize,
}

impl SharedPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffers the pool had to allocate fresh.
    #[must_use]
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Number of `rent` calls served.
    #[must_use]
    pub fn rents(&self) -> usize {
        self.rents.load(Ordering::Relaxed)
    }

    /// Number of buffers currently parked in the pool.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.lock().map_or(0, |free| free.len())
    }
}

impl BufferPool for SharedPool {
    fn rent(&self, min_len: usize) -> Vec<u8> {
        self.rents.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut free) = self.free.lock() {
            if let Some(idx) = free.iter().position(|b| b.len() >= min_len) {
                let mut buffer = free.swap_remove(idx);
                buffer.fill(0);
                return buffer;
            }
        }
        self.allocations.fetch_add(1, Ordering::Relaxed);
        alloc::vec![0; min_len]
    }

    fn release(&self, buffer: Vec<u8>) {
        debug!(len = buffer.len(), "buffer returned to pool");
        if let Ok(mut free) = self.free.lock() {
            free.push(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_buffers_are_reused() {
        let pool = SharedPool::new();
        let a = pool.rent(16);
        assert_eq!(a.len(), 16);
        pool.release(a);
        let b = pool.rent(8);
        assert!(b.len() >= 8);
        assert_eq!(pool.allocations(), 1);
        assert_eq!(pool.rents(), 2);
    }

    #[test]
    fn too_small_buffers_are_not_reused() {
        let pool = SharedPool::new();
        pool.release(alloc::vec![0; 4]);
        let b = pool.rent(32);
        assert_eq!(b.len(), 32);
        assert_eq!(pool.allocations(), 1);
        assert_eq!(pool.available(), 1);
    }
}
