//! Protocol module - wire format, framing, and stream reassembly support.
//!
//! This module implements the binary framing layer:
//! - 7-byte header encoding/decoding
//! - [`Packet`] with zero-copy payload
//! - [`ByteAccumulator`] holding partially-received stream data

mod accumulator;
mod frame;
mod wire_format;

pub use accumulator::ByteAccumulator;
pub use frame::{encode_frame, Packet};
pub use wire_format::{Header, DEFAULT_MAX_PAYLOAD_SIZE, FRAME_TAG, HEADER_SIZE};
