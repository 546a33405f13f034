//! Process-wide pool of entry buffers.
//!
//! Pooling is purely an allocation optimization; semantics never depend
//! on pool identity. A released buffer is truncated before it is
//! stored, so a later acquire can never observe stale entries.

use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::rule::Entry;

const POOL_MAX: usize = 1024;

static POOL: Lazy<Mutex<Vec<Vec<Entry>>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Returns an empty buffer with capacity at least `capacity`.
pub(crate) fn acquire(capacity: usize) -> Vec<Entry> {
    let recycled = POOL.lock().ok().and_then(|mut pool| pool.pop());
    match recycled {
        Some(mut buffer) => {
            if buffer.capacity() < capacity {
                buffer.reserve(capacity);
            }
            buffer
        }
        None => Vec::with_capacity(capacity),
    }
}

/// Clears `buffer` and returns it to the pool.
pub(crate) fn release(mut buffer: Vec<Entry>) {
    buffer.clear();
    if let Ok(mut pool) = POOL.lock() {
        if pool.len() < POOL_MAX {
            pool.push(buffer);
        }
    }
}
