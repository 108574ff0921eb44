//! Thread-safe FIFO queue of reassembled packets awaiting dispatch.
//!
//! Packets enter in stream order and leave in stream order. The queue is
//! the one structure shared between the receive path (writer) and the
//! dispatch drain (reader), so it carries its own lock; dispatch
//! concurrency, not the queue, determines final processing order.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::protocol::Packet;

/// Ordered queue of fully reassembled packets.
#[derive(Debug, Default)]
pub struct PacketQueue {
    inner: Mutex<VecDeque<Packet>>,
}

impl PacketQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    /// Push a packet at the tail.
    ///
    /// Returns `true` when the queue was empty beforehand: the
    /// empty-to-non-empty edge is what arms a dispatch drain.
    pub fn push(&self, packet: Packet) -> bool {
        let mut queue = self.inner.lock().unwrap();
        let was_empty = queue.is_empty();
        queue.push_back(packet);
        was_empty
    }

    /// Pop the packet at the head, if any.
    pub fn pop(&self) -> Option<Packet> {
        self.inner.lock().unwrap().pop_front()
    }

    /// Atomically take every queued packet, in order.
    ///
    /// The lock is held only for the take, never while the drained
    /// packets are submitted for execution.
    pub fn drain(&self) -> Vec<Packet> {
        let mut queue = self.inner.lock().unwrap();
        queue.drain(..).collect()
    }

    /// Number of queued packets.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    /// Discard all queued packets without dispatching them.
    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }
}
