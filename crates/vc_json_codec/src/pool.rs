use std::sync::{Mutex, MutexGuard, PoisonError};

/// Buffers kept at most.
const MAX_POOLED: usize = 32;
/// Buffers growing past this capacity are dropped instead of pooled.
const MAX_CAPACITY: usize = 1 << 20;

/// A pool of output buffers reused across encode calls.
#[derive(Default)]
pub(crate) struct BufferPool {
    buffers: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes an empty buffer.
    pub fn acquire(&self) -> Vec<u8> {
        self.lock().pop().unwrap_or_default()
    }

    /// Returns a buffer, its content is cleared.
    pub fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() > MAX_CAPACITY {
            return;
        }
        buf.clear();
        let mut buffers = self.lock();
        if buffers.len() < MAX_POOLED {
            buffers.push(buf);
        }
    }

    /// Drops every pooled buffer.
    pub fn clear(&self) {
        self.lock().clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Vec<u8>>> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{BufferPool, MAX_CAPACITY, MAX_POOLED};

    #[test]
    fn reuse_cleared() {
        let pool = BufferPool::new();
        let mut buf = pool.acquire();
        buf.extend_from_slice(b"stale");
        let capacity = buf.capacity();
        pool.release(buf);

        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), capacity);
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn bounded() {
        let pool = BufferPool::new();
        for _ in 0..MAX_POOLED + 4 {
            pool.release(Vec::with_capacity(8));
        }
        assert_eq!(pool.len(), MAX_POOLED);

        pool.release(Vec::with_capacity(MAX_CAPACITY + 1));
        assert_eq!(pool.len(), MAX_POOLED);

        pool.clear();
        assert_eq!(pool.len(), 0);
    }
}
