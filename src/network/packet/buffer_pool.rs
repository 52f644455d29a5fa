use std::ops::{Deref, DerefMut};
use parking_lot::Mutex;

/// Reusable payload buffers for frame reads.
#[derive(Debug)]
pub struct BufferPool {
    buffers: Mutex<Vec<Vec<u8>>>,
    capacity: usize,
    max_retained_capacity: usize,
}

impl BufferPool {
    pub fn new(buffers: usize, capacity: usize, max_retained_capacity: usize) -> Self {
        let stack = (0..buffers).map(|_| Vec::with_capacity(capacity)).collect();
        Self {
            buffers: Mutex::new(stack),
            capacity,
            max_retained_capacity: max_retained_capacity.max(capacity),
        }
    }

    /// Takes a cleared buffer, allocating a new one when the pool is empty.
    pub fn pull(&self) -> PooledBuffer<'_> {
        let buf = self
            .buffers
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.capacity));
        PooledBuffer { pool: self, buf }
    }

    /// Buffers currently waiting in the pool.
    pub fn available(&self) -> usize {
        self.buffers.lock().len()
    }

    fn give_back(&self, mut buf: Vec<u8>) {
        if buf.capacity() > self.max_retained_capacity {
            return;
        }
        buf.clear();
        self.buffers.lock().push(buf);
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(16, 4096, 1 << 20)
    }
}

/// Returns its buffer to the pool when dropped.
#[derive(Debug)]
pub struct PooledBuffer<'p> {
    pool: &'p BufferPool,
    buf: Vec<u8>,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.buf));
    }
}
