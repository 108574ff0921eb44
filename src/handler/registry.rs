//! Callback registry for dispatching packets by protocol id.
//!
//! Handlers are async closures (or anything implementing
//! [`ProtocolHandler`]) keyed by the frame's 16-bit protocol id. An
//! unregistered protocol id is not an error: the packet is dropped as a
//! logged no-op, by policy.
//!
//! # Example
//!
//! ```
//! use framelink::handler::CallbackRegistry;
//! use framelink::protocol::Packet;
//!
//! let mut registry = CallbackRegistry::new();
//! registry.register(10, |packet: Packet| async move {
//!     println!("got {} bytes", packet.payload_len());
//! });
//! assert!(registry.contains(10));
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::protocol::Packet;

/// Boxed future returned by handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A per-protocol packet handler.
///
/// Implemented for any `Fn(Packet) -> impl Future` closure; packets are
/// moved in, never copied.
pub trait ProtocolHandler: Send + Sync + 'static {
    /// Handle one packet.
    fn call(&self, packet: Packet) -> BoxFuture<'static, ()>;
}

impl<F, Fut> ProtocolHandler for F
where
    F: Fn(Packet) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn call(&self, packet: Packet) -> BoxFuture<'static, ()> {
        Box::pin((self)(packet))
    }
}

/// Registry mapping protocol ids to handlers.
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<u16, Box<dyn ProtocolHandler>>,
}

impl CallbackRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
        }
    }

    /// Register a handler for a protocol id, replacing any previous one.
    pub fn register<H: ProtocolHandler>(&mut self, protocol: u16, handler: H) {
        self.callbacks.insert(protocol, Box::new(handler));
    }

    /// Whether a handler is registered for this protocol id.
    pub fn contains(&self, protocol: u16) -> bool {
        self.callbacks.contains_key(&protocol)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Dispatch a packet to the handler for its protocol id.
    ///
    /// An unregistered id drops the packet without error.
    pub async fn dispatch(&self, packet: Packet) {
        match self.callbacks.get(&packet.protocol()) {
            Some(handler) => handler.call(packet).await,
            None => {
                tracing::trace!(
                    protocol = packet.protocol(),
                    "no callback registered, dropping packet"
                );
            }
        }
    }
}
