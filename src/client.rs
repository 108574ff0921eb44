//! Client builder and engine runtime.
//!
//! The [`ClientBuilder`] provides a fluent API for registering hooks and
//! per-protocol callbacks and for injecting collaborators. The
//! [`AsyncClient`] owns the connection lifecycle:
//! 1. `connect` races a TCP connect against a timeout
//! 2. a spawned receive loop reassembles frames from the stream
//! 3. reassembled packets queue up and drain into independent dispatch
//!    tasks running the validate/verify/callback pipeline
//! 4. `close` tears down idempotently with exactly one disconnect
//!    notification per transition
//!
//! # Example
//!
//! ```ignore
//! use framelink::ClientBuilder;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientBuilder::new()
//!         .on_protocol(10, |packet| async move {
//!             println!("got {} bytes", packet.payload_len());
//!         })
//!         .build();
//!
//!     client.connect("127.0.0.1", 9000, Duration::from_secs(5)).await?;
//!     client.send(10, b"hello").await?;
//!     client.close().await;
//!     Ok(())
//! }
//! ```

use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::diagnostics::{DiagnosticsSink, NullDiagnostics};
use crate::error::{ConnectError, FrameError, SendError};
use crate::handler::{CallbackRegistry, NoHooks, PacketHooks, ProtocolHandler, Verdict};
use crate::pool::{BufferRecycler, FreshBuffers};
use crate::protocol::{
    encode_frame, ByteAccumulator, Header, Packet, DEFAULT_MAX_PAYLOAD_SIZE, FRAME_TAG,
    HEADER_SIZE,
};
use crate::state::{ConnectionState, Phase};

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default receive buffer size (64 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Engine configuration, set through the builder.
#[derive(Debug, Clone)]
struct ClientConfig {
    connect_timeout: Duration,
    max_payload_size: u32,
    read_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

/// Builder for configuring and creating an [`AsyncClient`].
pub struct ClientBuilder {
    hooks: Arc<dyn PacketHooks>,
    callbacks: CallbackRegistry,
    diagnostics: Arc<dyn DiagnosticsSink>,
    recycler: Option<Arc<dyn BufferRecycler>>,
    config: ClientConfig,
}

impl ClientBuilder {
    /// Create a new builder with default hooks and collaborators.
    pub fn new() -> Self {
        Self {
            hooks: Arc::new(NoHooks),
            callbacks: CallbackRegistry::new(),
            diagnostics: Arc::new(NullDiagnostics),
            recycler: None,
            config: ClientConfig::default(),
        }
    }

    /// Install the packet hooks: validation, verification, forward
    /// routing, and connect/disconnect notifications.
    pub fn hooks(mut self, hooks: impl PacketHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Register a callback for a protocol id.
    ///
    /// Packets verified as `Accept` whose header carries this id are
    /// handed to the handler; ids with no handler are dropped as a
    /// no-op.
    pub fn on_protocol<H: ProtocolHandler>(mut self, protocol: u16, handler: H) -> Self {
        self.callbacks.register(protocol, handler);
        self
    }

    /// Install the diagnostics sink (fire-and-forget text lines).
    pub fn diagnostics(mut self, sink: impl DiagnosticsSink + 'static) -> Self {
        self.diagnostics = Arc::new(sink);
        self
    }

    /// Install the buffer recycler used for the receive buffer.
    pub fn recycler(mut self, recycler: impl BufferRecycler + 'static) -> Self {
        self.recycler = Some(Arc::new(recycler));
        self
    }

    /// Set the timeout used by `reconnect`. Default: 5 seconds.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the maximum accepted payload size. A header announcing more
    /// fails the connection. Default: 16 MiB.
    pub fn max_payload_size(mut self, limit: u32) -> Self {
        self.config.max_payload_size = limit;
        self
    }

    /// Set the receive buffer size. Default: 64 KiB.
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// Build the client. No I/O happens until `connect`.
    pub fn build(self) -> AsyncClient {
        let recycler = self
            .recycler
            .unwrap_or_else(|| Arc::new(FreshBuffers::new(self.config.read_buffer_size)));

        AsyncClient {
            inner: Arc::new(ClientInner {
                state: Mutex::new(ConnectionState::new()),
                writer: tokio::sync::Mutex::new(None),
                hooks: self.hooks,
                callbacks: Arc::new(self.callbacks),
                diagnostics: self.diagnostics,
                recycler,
                config: self.config,
            }),
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An asynchronous framed TCP client.
///
/// Cheaply cloneable; clones share the same connection. Call
/// [`close`](AsyncClient::close) when done; dropping the client does
/// not tear down an open connection.
#[derive(Clone)]
pub struct AsyncClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    /// Connection state; guards handle-swap and buffer-reset against
    /// in-flight reassembly. Never held across an await.
    state: Mutex<ConnectionState>,
    /// Write half of the transport. The async mutex serializes sends so
    /// frames are never interleaved on the wire.
    writer: tokio::sync::Mutex<Option<OwnedWriteHalf>>,
    hooks: Arc<dyn PacketHooks>,
    callbacks: Arc<CallbackRegistry>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    recycler: Arc<dyn BufferRecycler>,
    config: ClientConfig,
}

impl AsyncClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Connect to `host:port`, waiting up to `timeout`.
    ///
    /// Only acts from the disconnected state; if a transport handle
    /// already exists the call is a guarded no-op. On success the
    /// receive loop starts and the connect-complete hook fires. On
    /// timeout or transport failure the connection state is reset so a
    /// later attempt is accepted.
    pub async fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<(), ConnectError> {
        {
            let mut state = self.inner.state.lock().unwrap();
            if state.phase != Phase::Disconnected {
                tracing::debug!("connect ignored: transport handle already exists");
                return Ok(());
            }
            state.phase = Phase::Connecting;
            state.remote = Some((host.to_string(), port));
        }

        let stream = match try_connect(host, port, timeout).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(host, port, error = %e, "connect failed");
                self.inner.state.lock().unwrap().reset();
                return Err(e);
            }
        };

        let (read_half, write_half) = stream.into_split();

        // Install the write half first so the receive loop can trigger
        // teardown from its very first iteration.
        *self.inner.writer.lock().await = Some(write_half);

        let committed = {
            let mut state = self.inner.state.lock().unwrap();
            if state.phase == Phase::Connecting {
                state.phase = Phase::Connected;
                state.receive_task =
                    Some(tokio::spawn(receive_loop(self.inner.clone(), read_half)));
                true
            } else {
                false
            }
        };

        if !committed {
            // Torn down while the connect was in flight.
            self.inner.writer.lock().await.take();
            return Ok(());
        }

        tracing::debug!(host, port, "connected");
        self.inner
            .diagnostics
            .write_line(&format!("connected to {host}:{port}"));
        self.inner.hooks.on_connect().await;
        Ok(())
    }

    /// Re-enter `connect` with the last-used address and the configured
    /// timeout.
    ///
    /// Fails with [`ConnectError::InvalidAddress`] if no prior `connect`
    /// recorded an address. Only meaningful from the disconnected state.
    pub async fn reconnect(&self) -> Result<(), ConnectError> {
        let remote = self.inner.state.lock().unwrap().remote.clone();
        let Some((host, port)) = remote else {
            return Err(ConnectError::InvalidAddress(
                "no previous address to reconnect to".to_string(),
            ));
        };
        self.connect(&host, port, self.inner.config.connect_timeout)
            .await
    }

    /// Frame and send a payload under the given protocol id.
    ///
    /// Fails with [`SendError::NotConnected`] without a live transport
    /// handle. A transport write failure is returned to the caller and
    /// also closes the connection (with the disconnect notification).
    pub async fn send(&self, protocol: u16, payload: &[u8]) -> Result<(), SendError> {
        self.write_frame(encode_frame(protocol, payload)).await
    }

    /// Frame and send a UTF-8 string under the given protocol id.
    pub async fn send_text(&self, protocol: u16, text: &str) -> Result<(), SendError> {
        self.write_frame(encode_frame(protocol, text.as_bytes()))
            .await
    }

    /// Send a pre-built packet.
    ///
    /// The frame is re-encoded from the packet's payload, so the wire
    /// `payload_size` always matches the transmitted body.
    pub async fn send_packet(&self, packet: Packet) -> Result<(), SendError> {
        self.write_frame(packet.encode()).await
    }

    /// Whether the connection is currently established.
    pub fn is_connected(&self) -> bool {
        self.inner.state.lock().unwrap().phase == Phase::Connected
    }

    /// Close the connection.
    ///
    /// Idempotent: repeated calls are no-ops. Queued packets are
    /// discarded without dispatch; in-flight dispatch tasks run to
    /// completion against their already-extracted packets. The
    /// disconnect hook fires exactly once per transition into the
    /// disconnected state.
    pub async fn close(&self) {
        shutdown(&self.inner, true).await;
    }

    async fn write_frame(&self, frame: Vec<u8>) -> Result<(), SendError> {
        let mut guard = self.inner.writer.lock().await;
        let writer = guard.as_mut().ok_or(SendError::NotConnected)?;

        let result = async {
            writer.write_all(&frame).await?;
            writer.flush().await
        }
        .await;

        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "send failed, closing connection");
                self.inner
                    .diagnostics
                    .write_line(&format!("send error: {e}"));
                // Drop the dead handle before teardown re-takes the lock.
                guard.take();
                drop(guard);
                shutdown(&self.inner, true).await;
                Err(SendError::Transport(e))
            }
        }
    }
}

/// Resolve `host:port` to a socket address.
async fn resolve(host: &str, port: u16) -> Result<SocketAddr, ConnectError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }
    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| ConnectError::InvalidAddress(format!("{host}:{port}: {e}")))?;
    addrs
        .next()
        .ok_or_else(|| ConnectError::InvalidAddress(format!("{host}:{port}")))
}

/// Race a TCP connect against the timeout.
async fn try_connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, ConnectError> {
    let addr = resolve(host, port).await?;
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(ConnectError::Transport(e)),
        Err(_) => Err(ConnectError::Timeout(timeout)),
    }
}

/// Receive loop: one outstanding read at a time, reassembly under the
/// state lock, dispatch of every drained packet as its own task.
async fn receive_loop(inner: Arc<ClientInner>, mut reader: OwnedReadHalf) {
    let mut buf = inner.recycler.acquire();
    let queue = inner.state.lock().unwrap().packets.clone();

    loop {
        buf.clear();
        let n = match reader.read_buf(&mut buf).await {
            Ok(0) => {
                tracing::debug!("peer closed the connection");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "receive failed");
                inner
                    .diagnostics
                    .write_line(&format!("receive error: {e}"));
                break;
            }
        };
        tracing::trace!(bytes = n, "received");

        // Reassemble while holding the state lock; close/reconnect
        // mutate the same buffers and must not interleave.
        let extracted = {
            let mut state = inner.state.lock().unwrap();
            state.accumulator.append(&buf[..n]);
            extract_frames(&mut state.accumulator, inner.config.max_payload_size)
        };

        let packets = match extracted {
            Ok(packets) => packets,
            Err(e) => {
                tracing::warn!(error = %e, "stream desynchronized, closing");
                inner.diagnostics.write_line(&format!("frame error: {e}"));
                break;
            }
        };

        let mut drain_armed = false;
        for packet in packets {
            drain_armed |= queue.push(packet);
        }

        if drain_armed {
            for packet in queue.drain() {
                let hooks = inner.hooks.clone();
                let callbacks = inner.callbacks.clone();
                tokio::spawn(run_pipeline(hooks, callbacks, packet));
            }
        }
    }

    inner.recycler.release(buf);
    shutdown(&inner, false).await;
}

/// Extract every complete frame from the accumulator.
///
/// Stops cleanly on a partial header or partial body (those bytes stay
/// buffered for the next receive completion). A bad tag or oversized
/// announced payload is fatal: the caller closes the connection.
fn extract_frames(
    accumulator: &mut ByteAccumulator,
    max_payload_size: u32,
) -> Result<Vec<Packet>, FrameError> {
    let mut packets = Vec::new();
    loop {
        if accumulator.len() < HEADER_SIZE {
            break;
        }
        let head = accumulator.peek(0, HEADER_SIZE)?;
        let header = Header::decode(&head)?;

        if header.payload_size > max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: header.payload_size,
                limit: max_payload_size,
            });
        }

        if accumulator.len() < header.frame_len() {
            // Partial frame; the header stays unconsumed until enough
            // data arrives.
            break;
        }

        let frame = accumulator.read(header.frame_len())?;
        packets.push(Packet::from_frame_bytes(header, frame));
    }
    Ok(packets)
}

/// The per-packet dispatch pipeline.
///
/// Runs as an independent task; packets from the same connection are
/// enqueued in stream order but may complete out of order. The packet is
/// dropped on every exit branch.
async fn run_pipeline(
    hooks: Arc<dyn PacketHooks>,
    callbacks: Arc<CallbackRegistry>,
    mut packet: Packet,
) {
    if let Err(e) = hooks.validate(&mut packet) {
        tracing::warn!(protocol = packet.protocol(), error = %e, "packet validation failed");
        return;
    }

    // Re-checked after validation; a transforming hook must not have
    // clobbered the header.
    if packet.header.tag != FRAME_TAG {
        tracing::warn!(tag = packet.header.tag, "packet tag mismatch, dropping");
        return;
    }

    match hooks.verify(&packet) {
        Verdict::Ignore => {
            tracing::debug!(protocol = packet.protocol(), "packet ignored");
        }
        Verdict::Forward => hooks.forward(packet).await,
        Verdict::Accept => callbacks.dispatch(packet).await,
    }
}

/// Tear the connection down and notify, exactly once per transition
/// into the disconnected state.
///
/// `abort_receive` is false when called from the receive loop itself
/// (the loop is already exiting; aborting it here could cancel the
/// notification). No lock is held across the disconnect hook.
async fn shutdown(inner: &Arc<ClientInner>, abort_receive: bool) {
    let receive_task = {
        let mut state = inner.state.lock().unwrap();
        if state.phase == Phase::Disconnected {
            return;
        }
        state.phase = Phase::Closing;
        let task = state.receive_task.take();
        state.reset();
        task
    };

    if abort_receive {
        if let Some(task) = receive_task {
            task.abort();
        }
    }

    inner.writer.lock().await.take();

    tracing::debug!("disconnected");
    inner.diagnostics.write_line("disconnected");
    inner.hooks.on_disconnect().await;
}
