use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use bytes::BytesMut;
use parking_lot::Mutex;

/// Initial capacity of a freshly allocated body buffer.
const INITIAL_BUF_CAPACITY: usize = 4 * 1024;

/// Buffers that grew past this size are dropped on release instead of being kept idle.
const MAX_RETAINED_BUF_CAPACITY: usize = 1024 * 1024;

/// Free list of response body buffers shared by every request of one client.
///
/// Buffers are handed out as [`PooledBuf`] guards and go back to the free list when the
/// guard is dropped, so every exit path of a request (success, error, cancelled by a
/// timeout) releases its buffer.
#[derive(Debug, Clone)]
pub struct BufferPool {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    free: Mutex<Vec<BytesMut>>,
    max_idle: usize,
}

impl BufferPool {
    #[must_use]
    pub fn new(max_idle: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                free: Mutex::new(Vec::with_capacity(max_idle)),
                max_idle,
            }),
        }
    }

    #[must_use]
    pub fn acquire(&self) -> PooledBuf {
        let buf = self
            .inner
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| BytesMut::with_capacity(INITIAL_BUF_CAPACITY));

        PooledBuf {
            buf,
            pool: self.inner.clone(),
        }
    }

    /// Number of buffers currently parked in the free list.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.inner.free.lock().len()
    }
}

pub struct PooledBuf {
    buf: BytesMut,
    pool: Arc<Inner>,
}

impl PooledBuf {
    pub fn extend_from_slice(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }
}

impl Deref for PooledBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl AsRef<[u8]> for PooledBuf {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl fmt::Debug for PooledBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBuf")
            .field("len", &self.buf.len())
            .field("capacity", &self.buf.capacity())
            .finish()
    }
}

impl Drop for PooledBuf {
    fn drop(&mut self) {
        let mut buf = std::mem::take(&mut self.buf);
        if buf.capacity() > MAX_RETAINED_BUF_CAPACITY {
            return;
        }
        buf.clear();

        let mut free = self.pool.free.lock();
        if free.len() < self.pool.max_idle {
            free.push(buf);
        }
    }
}
