//! Extension hooks for the packet pipeline.
//!
//! The engine treats payload bytes opaquely past framing; everything
//! protocol-specific happens through an injected [`PacketHooks`]
//! implementation and the per-protocol callback table. Hooks are a
//! capability trait, not a subclassing surface: implement what you need,
//! the defaults accept everything and do nothing.

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::protocol::Packet;

/// Decision returned by [`PacketHooks::verify`] for each packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    /// Fall through to per-protocol callback dispatch.
    #[default]
    Accept,
    /// Drop the packet silently.
    Ignore,
    /// Hand the packet to [`PacketHooks::forward`] instead of a local
    /// callback; used when this client relays traffic for another
    /// destination.
    Forward,
}

/// Pluggable policy for packet handling and connection lifecycle events.
///
/// Every method has a default body, so an implementation only overrides
/// the seams it cares about. A failure returned from `validate` aborts
/// processing of that one packet; it never affects the connection. A
/// panic inside any hook kills only the dispatch task running that
/// packet.
#[async_trait]
pub trait PacketHooks: Send + Sync {
    /// Content validation, run first in the pipeline. May reinterpret or
    /// transform the payload in place (e.g. decompress).
    fn validate(&self, _packet: &mut Packet) -> Result<(), DispatchError> {
        Ok(())
    }

    /// Classify the packet after validation.
    fn verify(&self, _packet: &Packet) -> Verdict {
        Verdict::Accept
    }

    /// Relay routing for packets verified as [`Verdict::Forward`]. The
    /// packet is consumed; it never reaches the callback table.
    async fn forward(&self, _packet: Packet) {}

    /// Invoked once after a successful `connect`.
    async fn on_connect(&self) {}

    /// Invoked exactly once per transition into the disconnected state.
    async fn on_disconnect(&self) {}
}

/// Default hooks: accept every packet, no lifecycle behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

#[async_trait]
impl PacketHooks for NoHooks {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_verdict_is_accept() {
        assert_eq!(Verdict::default(), Verdict::Accept);
    }

    #[tokio::test]
    async fn test_no_hooks_accepts_everything() {
        let hooks = NoHooks;
        let mut packet = Packet::from_parts(1, b"anything");

        assert!(hooks.validate(&mut packet).is_ok());
        assert_eq!(hooks.verify(&packet), Verdict::Accept);
        hooks.forward(packet).await;
        hooks.on_connect().await;
        hooks.on_disconnect().await;
    }

    #[tokio::test]
    async fn test_custom_hooks_override() {
        struct EvenOnly;

        #[async_trait]
        impl PacketHooks for EvenOnly {
            fn verify(&self, packet: &Packet) -> Verdict {
                if packet.protocol() % 2 == 0 {
                    Verdict::Accept
                } else {
                    Verdict::Ignore
                }
            }
        }

        let hooks = EvenOnly;
        assert_eq!(hooks.verify(&Packet::from_parts(2, b"")), Verdict::Accept);
        assert_eq!(hooks.verify(&Packet::from_parts(3, b"")), Verdict::Ignore);
    }
}
