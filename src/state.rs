//! Per-connection mutable state.
//!
//! One [`ConnectionState`] exists per client instance. It bundles the
//! lifecycle phase, the byte accumulator, the packet queue, and the
//! handle of the receive task, and is reset (not destroyed) on
//! disconnect so the client can connect again.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::protocol::ByteAccumulator;
use crate::queue::PacketQueue;

/// Connection lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Disconnected,
    Connecting,
    Connected,
    Closing,
}

/// The single mutable record scoping one logical connection.
///
/// Mutated under the client's state lock; close and reconnect paths
/// mutually exclude against in-flight reassembly through that lock.
pub(crate) struct ConnectionState {
    pub phase: Phase,
    /// Stream bytes not yet assembled into a full frame.
    pub accumulator: ByteAccumulator,
    /// Reassembled packets awaiting dispatch. The `Arc` is shared with
    /// the receive task and survives resets; only the contents are
    /// cleared.
    pub packets: Arc<PacketQueue>,
    /// Handle of the spawned receive loop, present while connected.
    pub receive_task: Option<JoinHandle<()>>,
    /// Last-used remote address, kept across resets for `reconnect`.
    pub remote: Option<(String, u16)>,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Disconnected,
            accumulator: ByteAccumulator::new(),
            packets: Arc::new(PacketQueue::new()),
            receive_task: None,
            remote: None,
        }
    }

    /// Return to a fresh disconnected state.
    ///
    /// Clears the transport-facing fields and both buffers; queued
    /// packets are discarded without dispatch. The remote address is
    /// kept so `reconnect` still works.
    pub fn reset(&mut self) {
        self.phase = Phase::Disconnected;
        self.accumulator.clear();
        self.packets.clear();
        self.receive_task = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Packet;

    #[test]
    fn test_new_state_is_disconnected() {
        let state = ConnectionState::new();
        assert_eq!(state.phase, Phase::Disconnected);
        assert!(state.accumulator.is_empty());
        assert!(state.packets.is_empty());
        assert!(state.receive_task.is_none());
        assert!(state.remote.is_none());
    }

    #[test]
    fn test_reset_clears_buffers_keeps_remote() {
        let mut state = ConnectionState::new();
        state.phase = Phase::Connected;
        state.accumulator.append(b"partial frame");
        state.packets.push(Packet::from_parts(1, b"queued"));
        state.remote = Some(("127.0.0.1".to_string(), 4000));

        let queue = state.packets.clone();
        state.reset();

        assert_eq!(state.phase, Phase::Disconnected);
        assert!(state.accumulator.is_empty());
        assert!(state.packets.is_empty());
        // Same queue allocation, only the contents are gone.
        assert!(Arc::ptr_eq(&state.packets, &queue));
        assert_eq!(state.remote, Some(("127.0.0.1".to_string(), 4000)));
    }
}
