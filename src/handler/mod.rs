//! Handler module - extension hooks and per-protocol dispatch.
//!
//! Provides:
//! - [`PacketHooks`] - pluggable validation/verification/forwarding and
//!   connection lifecycle notifications
//! - [`CallbackRegistry`] - maps protocol ids to async handlers

mod hooks;
mod registry;

pub use hooks::{NoHooks, PacketHooks, Verdict};
pub use registry::{BoxFuture, CallbackRegistry, ProtocolHandler};
