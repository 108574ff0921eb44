//! Packet type and frame building.
//!
//! A [`Packet`] is one header-plus-payload unit. Uses `bytes::Bytes` for
//! zero-copy payload sharing: an inbound packet's payload is a slice of
//! the receive buffer, not a fresh allocation.
//!
//! # Example
//!
//! ```
//! use framelink::protocol::{encode_frame, Packet, HEADER_SIZE};
//! use bytes::Bytes;
//!
//! let packet = Packet::new(12, Bytes::from_static(b"hello"));
//! assert_eq!(packet.protocol(), 12);
//! assert_eq!(packet.encode().len(), HEADER_SIZE + 5);
//! ```

use bytes::Bytes;

use super::wire_format::{Header, HEADER_SIZE};

/// A complete protocol packet.
///
/// Transient by design: constructed, handed through exactly one dispatch
/// path, then dropped. Dropping releases the payload buffer on every exit
/// branch, including validation failure and hook panics.
#[derive(Debug, Clone)]
pub struct Packet {
    /// Decoded header. `payload_size` always matches `payload.len()`.
    pub header: Header,
    /// Payload bytes (zero-copy via `bytes::Bytes`).
    pub payload: Bytes,
}

impl Packet {
    /// Create an outbound packet from a protocol id and payload.
    pub fn new(protocol: u16, payload: Bytes) -> Self {
        Self {
            header: Header::new(protocol, payload.len() as u32),
            payload,
        }
    }

    /// Create a packet from a protocol id and raw bytes (copies data).
    pub fn from_parts(protocol: u16, payload: &[u8]) -> Self {
        Self::new(protocol, Bytes::copy_from_slice(payload))
    }

    /// Build a packet from a complete frame image (header included).
    ///
    /// Pure slicing, no I/O. The caller must have confirmed
    /// `frame.len() >= header.frame_len()`; reassembly establishes this
    /// before reading the frame out of the accumulator.
    pub fn from_frame_bytes(header: Header, frame: Bytes) -> Self {
        debug_assert!(frame.len() >= header.frame_len());
        Self {
            payload: frame.slice(HEADER_SIZE..header.frame_len()),
            header,
        }
    }

    /// Get the protocol id.
    #[inline]
    pub fn protocol(&self) -> u16 {
        self.header.protocol
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get the payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Encode the packet as a contiguous wire image.
    pub fn encode(&self) -> Vec<u8> {
        encode_frame(self.header.protocol, &self.payload)
    }
}

/// Build a complete frame as a single byte vector.
///
/// Writes tag, protocol, payload length, then the payload, contiguous.
///
/// # Example
///
/// ```
/// use framelink::protocol::{encode_frame, HEADER_SIZE};
///
/// let bytes = encode_frame(1, b"hello");
/// assert_eq!(bytes.len(), HEADER_SIZE + 5);
/// ```
pub fn encode_frame(protocol: u16, payload: &[u8]) -> Vec<u8> {
    let header = Header::new(protocol, payload.len() as u32);
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_creation() {
        let packet = Packet::new(3, Bytes::from_static(b"hello"));

        assert_eq!(packet.protocol(), 3);
        assert_eq!(packet.payload(), b"hello");
        assert_eq!(packet.payload_len(), 5);
        assert_eq!(packet.header.payload_size, 5);
    }

    #[test]
    fn test_packet_from_parts() {
        let packet = Packet::from_parts(2, b"test");

        assert_eq!(packet.protocol(), 2);
        assert_eq!(packet.payload(), b"test");
    }

    #[test]
    fn test_packet_empty_payload() {
        let packet = Packet::new(1, Bytes::new());

        assert_eq!(packet.payload_len(), 0);
        assert!(packet.payload().is_empty());
        assert_eq!(packet.header.payload_size, 0);
    }

    #[test]
    fn test_encode_frame_layout() {
        let bytes = encode_frame(1, b"hello");
        assert_eq!(bytes.len(), HEADER_SIZE + 5);

        let header = Header::decode(&bytes[..HEADER_SIZE]).unwrap();
        assert_eq!(header.protocol, 1);
        assert_eq!(header.payload_size, 5);
        assert_eq!(&bytes[HEADER_SIZE..], b"hello");
    }

    #[test]
    fn test_encode_frame_empty_payload() {
        let bytes = encode_frame(1, b"");
        assert_eq!(bytes.len(), HEADER_SIZE);
    }

    #[test]
    fn test_from_frame_bytes_slices_past_header() {
        let wire = Bytes::from(encode_frame(9, b"payload"));
        let header = Header::decode(&wire).unwrap();
        let packet = Packet::from_frame_bytes(header, wire);

        assert_eq!(packet.protocol(), 9);
        assert_eq!(packet.payload(), b"payload");
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let packet = Packet::from_parts(0x1234, b"round trip data");
        let wire = Bytes::from(packet.encode());

        let header = Header::decode(&wire).unwrap();
        let decoded = Packet::from_frame_bytes(header, wire);

        assert_eq!(decoded.protocol(), 0x1234);
        assert_eq!(decoded.payload(), b"round trip data");
    }

    #[test]
    fn test_payload_is_zero_copy_slice() {
        let wire = Bytes::from(encode_frame(1, b"shared"));
        let header = Header::decode(&wire).unwrap();
        let packet = Packet::from_frame_bytes(header, wire.clone());

        // The payload points into the original frame buffer.
        assert_eq!(packet.payload.as_ptr(), wire[HEADER_SIZE..].as_ptr());
    }
}
