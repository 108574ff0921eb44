//! # framelink
//!
//! Asynchronous framed TCP client engine.
//!
//! Connects to a remote endpoint, reassembles the byte stream into
//! discrete packets framed as `tag · protocol · payload_size · payload`,
//! verifies and routes each packet through pluggable hooks, and
//! dispatches it to per-protocol callbacks. Outbound framing and
//! send-path error recovery are owned by the same engine.
//!
//! ## Architecture
//!
//! - **Receive path**: one spawned loop per connection with a single
//!   outstanding read; bytes accumulate until a full frame is available,
//!   then reassembled packets queue up in stream order.
//! - **Dispatch**: the queue drains into independent tasks, each running
//!   validate → verify (Ignore/Forward/Accept) → callback. Packets are
//!   enqueued in stream order but may complete out of order; callers
//!   needing ordered delivery serialize at the callback layer.
//! - **Errors**: framing and transport errors are fatal to the
//!   connection (close and notify, never resync); validation failures
//!   are local to one packet.
//!
//! ## Example
//!
//! ```ignore
//! use framelink::ClientBuilder;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientBuilder::new()
//!         .on_protocol(10, |packet| async move {
//!             println!("protocol 10: {} bytes", packet.payload_len());
//!         })
//!         .build();
//!
//!     client.connect("127.0.0.1", 9000, Duration::from_secs(5)).await?;
//!     client.send(10, b"hello").await?;
//!     client.close().await;
//!     Ok(())
//! }
//! ```

pub mod diagnostics;
pub mod error;
pub mod handler;
pub mod pool;
pub mod protocol;
pub mod queue;

mod client;
mod state;

pub use client::{AsyncClient, ClientBuilder, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_BUFFER_SIZE};
pub use diagnostics::{DiagnosticsSink, NullDiagnostics};
pub use error::{ConnectError, DispatchError, FrameError, SendError};
pub use handler::{CallbackRegistry, NoHooks, PacketHooks, ProtocolHandler, Verdict};
pub use pool::{BufferRecycler, FreshBuffers};
pub use protocol::{encode_frame, Header, Packet, FRAME_TAG, HEADER_SIZE};
