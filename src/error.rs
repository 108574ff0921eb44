//! Error types for framelink.
//!
//! The taxonomy mirrors the engine's failure boundaries: [`ConnectError`]
//! for the connect path, [`FrameError`] for framing/reassembly (fatal to
//! the connection), [`SendError`] for the send path, and [`DispatchError`]
//! for pipeline-local failures that never leave a dispatch task.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by [`connect`](crate::AsyncClient::connect) and
/// [`reconnect`](crate::AsyncClient::reconnect).
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The address could not be parsed or resolved.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The connect attempt did not complete within the timeout.
    ///
    /// Connection state is reset, so a subsequent `connect` or
    /// `reconnect` attempt is accepted.
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),

    /// Transport-level connect failure (refused, unreachable, ...).
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

/// Framing errors raised while decoding the wire stream.
///
/// During reassembly these are fatal to the connection: byte-level
/// desynchronization cannot be safely resumed, so the engine closes and
/// notifies instead of retrying.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The tag byte did not match [`FRAME_TAG`](crate::protocol::FRAME_TAG).
    #[error("bad frame tag 0x{found:02x}")]
    BadTag {
        /// The byte found where the tag sentinel was expected.
        found: u8,
    },

    /// A peek or read asked for more bytes than are buffered.
    #[error("insufficient data: need {needed} bytes, have {available}")]
    InsufficientData { needed: usize, available: usize },

    /// A header announced a payload larger than the configured limit.
    #[error("payload size {size} exceeds maximum {limit}")]
    PayloadTooLarge { size: u32, limit: u32 },
}

/// Errors returned by the send path.
///
/// A transport-level send failure also closes the connection and fires the
/// disconnect notification; the error is returned to the caller rather
/// than retried.
#[derive(Debug, Error)]
pub enum SendError {
    /// No live transport handle; `connect` first.
    #[error("not connected")]
    NotConnected,

    /// The transport write failed.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

/// A pipeline-local failure while processing one packet.
///
/// Returned by [`PacketHooks::validate`](crate::handler::PacketHooks::validate);
/// logged and swallowed by the dispatch task, never propagated to the
/// receive loop or other packets.
#[derive(Debug, Error)]
#[error("dispatch error: {0}")]
pub struct DispatchError(pub String);

impl DispatchError {
    /// Convenience constructor from anything displayable.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_display() {
        let err = FrameError::BadTag { found: 0x41 };
        assert_eq!(err.to_string(), "bad frame tag 0x41");

        let err = FrameError::InsufficientData {
            needed: 7,
            available: 3,
        };
        assert!(err.to_string().contains("need 7"));
        assert!(err.to_string().contains("have 3"));
    }

    #[test]
    fn test_connect_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: ConnectError = io.into();
        assert!(matches!(err, ConnectError::Transport(_)));
    }

    #[test]
    fn test_send_error_display() {
        assert_eq!(SendError::NotConnected.to_string(), "not connected");
    }

    #[test]
    fn test_dispatch_error_new() {
        let err = DispatchError::new("decompression failed");
        assert_eq!(err.to_string(), "dispatch error: decompression failed");
    }
}
