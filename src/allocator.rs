use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

/// Buffers kept per shard before further returns are dropped.
const MAX_POOLED: usize = 16;

/// Pool of index buffers shared by all branches of one radix sort.
///
/// The pool is split into one shard per rayon worker. A request locks only the
/// shard of the calling worker, so branches recursing on different workers
/// never wait on each other.
#[derive(Debug)]
pub struct ScratchAllocator {
    shards: Vec<Mutex<Vec<Vec<usize>>>>,
}

impl Default for ScratchAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScratchAllocator {
    /// One shard per thread of the current rayon pool.
    pub fn new() -> Self {
        Self::with_shards(rayon::current_num_threads())
    }

    pub fn with_shards(shards: usize) -> Self {
        Self { shards: (0..shards.max(1)).map(|_| Mutex::new(Vec::new())).collect() }
    }

    fn shard(&self) -> &Mutex<Vec<Vec<usize>>> {
        let idx = rayon::current_thread_index().unwrap_or(0) % self.shards.len();
        &self.shards[idx]
    }

    /// Hands out a zeroed buffer of `len` entries.
    pub fn take(&self, len: usize) -> ScratchBuf<'_> {
        let mut buf = self.shard().lock().pop().unwrap_or_default();
        buf.clear();
        buf.resize(len, 0);
        ScratchBuf { buf, pool: self }
    }

    fn give(&self, buf: Vec<usize>) {
        let mut shard = self.shard().lock();
        if shard.len() < MAX_POOLED {
            shard.push(buf);
        }
    }

    /// Number of buffers currently parked in the pool.
    pub fn pooled(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }
}

/// A pooled buffer that returns to its allocator when dropped.
#[derive(Debug)]
pub struct ScratchBuf<'a> {
    buf: Vec<usize>,
    pool: &'a ScratchAllocator,
}

impl Deref for ScratchBuf<'_> {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.buf
    }
}

impl DerefMut for ScratchBuf<'_> {
    fn deref_mut(&mut self) -> &mut [usize] {
        &mut self.buf
    }
}

impl Drop for ScratchBuf<'_> {
    fn drop(&mut self) {
        self.pool.give(std::mem::take(&mut self.buf));
    }
}
