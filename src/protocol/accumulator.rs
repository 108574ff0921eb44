//! Byte accumulator for partially-received stream data.
//!
//! Uses `bytes::BytesMut` so consuming reads hand out zero-copy slices of
//! the underlying buffer. The accumulator's content is always an
//! unconsumed prefix of the raw stream: bytes are appended at the tail,
//! peeked without removal, and consumed strictly from the front, so
//! nothing is ever lost or reordered.
//!
//! There is no internal growth limit. Callers that need bounded memory
//! must impose their own cap; the client engine does so by rejecting
//! headers whose announced payload exceeds its configured maximum.

use bytes::{Bytes, BytesMut};

use crate::error::FrameError;

/// Growable byte buffer holding stream data until a full frame is
/// available.
#[derive(Debug, Default)]
pub struct ByteAccumulator {
    buf: BytesMut,
}

impl ByteAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Create an accumulator with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append newly received bytes at the tail.
    pub fn append(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Return a copy of `len` bytes at `offset` without consuming them.
    ///
    /// Fails with [`FrameError::InsufficientData`] when `offset + len`
    /// exceeds the buffered length. Callers check `len()` first; the
    /// reassembly loop establishes that discipline.
    pub fn peek(&self, offset: usize, len: usize) -> Result<Bytes, FrameError> {
        let end = offset + len;
        if end > self.buf.len() {
            return Err(FrameError::InsufficientData {
                needed: end,
                available: self.buf.len(),
            });
        }
        Ok(Bytes::copy_from_slice(&self.buf[offset..end]))
    }

    /// Remove and return the first `len` bytes.
    ///
    /// Fails with [`FrameError::InsufficientData`] when fewer than `len`
    /// bytes are buffered. The returned `Bytes` is a zero-copy split of
    /// the internal buffer.
    pub fn read(&mut self, len: usize) -> Result<Bytes, FrameError> {
        if len > self.buf.len() {
            return Err(FrameError::InsufficientData {
                needed: len,
                available: self.buf.len(),
            });
        }
        Ok(self.buf.split_to(len).freeze())
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the accumulator is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Discard all buffered bytes.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_len() {
        let mut acc = ByteAccumulator::new();
        assert!(acc.is_empty());

        acc.append(b"hello");
        assert_eq!(acc.len(), 5);

        acc.append(b" world");
        assert_eq!(acc.len(), 11);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut acc = ByteAccumulator::new();
        acc.append(b"abcdef");

        let peeked = acc.peek(0, 3).unwrap();
        assert_eq!(&peeked[..], b"abc");
        assert_eq!(acc.len(), 6);

        // Peek again, same bytes.
        let peeked = acc.peek(0, 3).unwrap();
        assert_eq!(&peeked[..], b"abc");
    }

    #[test]
    fn test_peek_at_offset() {
        let mut acc = ByteAccumulator::new();
        acc.append(b"abcdef");

        let peeked = acc.peek(2, 3).unwrap();
        assert_eq!(&peeked[..], b"cde");
    }

    #[test]
    fn test_read_consumes_prefix() {
        let mut acc = ByteAccumulator::new();
        acc.append(b"abcdef");

        let read = acc.read(4).unwrap();
        assert_eq!(&read[..], b"abcd");
        assert_eq!(acc.len(), 2);

        let rest = acc.read(2).unwrap();
        assert_eq!(&rest[..], b"ef");
        assert!(acc.is_empty());
    }

    #[test]
    fn test_peek_insufficient_data() {
        let mut acc = ByteAccumulator::new();
        acc.append(b"ab");

        let err = acc.peek(0, 3).unwrap_err();
        assert_eq!(
            err,
            FrameError::InsufficientData {
                needed: 3,
                available: 2
            }
        );

        let err = acc.peek(1, 2).unwrap_err();
        assert_eq!(
            err,
            FrameError::InsufficientData {
                needed: 3,
                available: 2
            }
        );
    }

    #[test]
    fn test_read_insufficient_data() {
        let mut acc = ByteAccumulator::new();
        acc.append(b"ab");

        let err = acc.read(3).unwrap_err();
        assert_eq!(
            err,
            FrameError::InsufficientData {
                needed: 3,
                available: 2
            }
        );
        // Failed read leaves the buffer untouched.
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn test_stream_prefix_invariant() {
        // Interleaved appends and reads always hand bytes out in stream
        // order.
        let mut acc = ByteAccumulator::new();
        acc.append(b"123");
        acc.append(b"456");

        assert_eq!(&acc.read(2).unwrap()[..], b"12");
        acc.append(b"789");
        assert_eq!(&acc.read(4).unwrap()[..], b"3456");
        assert_eq!(&acc.read(3).unwrap()[..], b"789");
    }

    #[test]
    fn test_clear() {
        let mut acc = ByteAccumulator::with_capacity(64);
        acc.append(b"leftover");
        acc.clear();

        assert!(acc.is_empty());
        assert_eq!(acc.len(), 0);
    }

    #[test]
    fn test_read_zero_len() {
        let mut acc = ByteAccumulator::new();
        acc.append(b"x");
        let read = acc.read(0).unwrap();
        assert!(read.is_empty());
        assert_eq!(acc.len(), 1);
    }
}
