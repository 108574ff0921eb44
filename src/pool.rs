//! Buffer recycling interface.
//!
//! The receive loop acquires its read buffer from an injected recycler
//! and releases it on teardown, so a host process can plug in a real
//! object pool and avoid per-connection allocations. The engine depends
//! only on the `acquire`/`release` pair; [`FreshBuffers`] is the trivial
//! default that allocates on demand and lets released buffers drop.

use bytes::BytesMut;

/// Recycled-buffer allocator.
pub trait BufferRecycler: Send + Sync {
    /// Hand out a buffer ready for reading into.
    fn acquire(&self) -> BytesMut;

    /// Return a buffer to the pool.
    fn release(&self, buf: BytesMut);
}

/// Default recycler: fresh allocation per acquire, drop on release.
#[derive(Debug, Clone, Copy)]
pub struct FreshBuffers {
    capacity: usize,
}

impl FreshBuffers {
    /// Create a recycler handing out buffers of the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }
}

impl BufferRecycler for FreshBuffers {
    fn acquire(&self) -> BytesMut {
        BytesMut::with_capacity(self.capacity)
    }

    fn release(&self, _buf: BytesMut) {}
}
