//! Packet Structures and Serialization
//!
//! Every packet carries three 32-bit header fields followed by a fixed
//! 20-byte payload. A data packet uses `seqnum` and leaves `acknum` at the
//! [`NOT_IN_USE`] sentinel; an acknowledgment does the opposite.
//!
//! ```text
//!  0        4        8        12                     32
//!  +--------+--------+--------+----------------------+
//!  | seqnum | acknum |checksum|  payload (20 bytes)  |
//!  +--------+--------+--------+----------------------+
//! ```

use crate::checksum;
use crate::sequence::SeqNum;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;
use thiserror::Error;

/// Size of every payload in bytes
pub const PAYLOAD_SIZE: usize = 20;

/// Size of the header (seqnum, acknum, checksum)
pub const HEADER_SIZE: usize = 12;

/// Size of an encoded packet
pub const PACKET_SIZE: usize = HEADER_SIZE + PAYLOAD_SIZE;

/// Value of header fields that carry no meaning for the packet kind
pub const NOT_IN_USE: i32 = -1;

/// Byte used to fill acknowledgment payloads
const ACK_FILL: u8 = b'0';

/// Packet errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PacketError {
    #[error("Insufficient data: expected {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },
}

/// Fixed-size application message
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Payload([u8; PAYLOAD_SIZE]);

impl Payload {
    /// Wrap a full payload block
    pub const fn new(data: [u8; PAYLOAD_SIZE]) -> Self {
        Payload(data)
    }

    /// Payload made of one repeated byte
    pub const fn filled(byte: u8) -> Self {
        Payload([byte; PAYLOAD_SIZE])
    }

    /// Build a payload from an arbitrary slice
    ///
    /// Longer input is truncated, shorter input is zero-padded.
    pub fn from_slice(data: &[u8]) -> Self {
        let mut block = [0u8; PAYLOAD_SIZE];
        let len = data.len().min(PAYLOAD_SIZE);
        block[..len].copy_from_slice(&data[..len]);
        Payload(block)
    }

    pub fn as_bytes(&self) -> &[u8; PAYLOAD_SIZE] {
        &self.0
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8; PAYLOAD_SIZE] {
        &mut self.0
    }
}

impl Default for Payload {
    fn default() -> Self {
        Payload([0u8; PAYLOAD_SIZE])
    }
}

impl From<[u8; PAYLOAD_SIZE]> for Payload {
    fn from(data: [u8; PAYLOAD_SIZE]) -> Self {
        Payload(data)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// A data or acknowledgment packet
///
/// Header fields are public so that a channel can tamper with them; the
/// constructors always stamp a matching checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Sequence number (data packets)
    pub seqnum: i32,
    /// Acknowledged sequence number (acknowledgment packets)
    pub acknum: i32,
    /// Integrity code over seqnum, acknum and payload
    pub checksum: i32,
    /// Payload block
    pub payload: Payload,
}

impl Packet {
    /// Create a data packet carrying `payload`
    pub fn data(seq: SeqNum, payload: Payload) -> Self {
        Self::stamped(seq.as_field(), NOT_IN_USE, payload)
    }

    /// Create an acknowledgment for the data packet numbered `acknum`
    ///
    /// `ack_seq` lands in the `seqnum` field; it is opaque to the sender in a
    /// simplex session.
    pub fn ack_for(acknum: i32, ack_seq: i32) -> Self {
        Self::stamped(ack_seq, acknum, Payload::filled(ACK_FILL))
    }

    fn stamped(seqnum: i32, acknum: i32, payload: Payload) -> Self {
        let mut packet = Packet {
            seqnum,
            acknum,
            checksum: 0,
            payload,
        };
        packet.checksum = checksum::compute(&packet);
        packet
    }

    /// Check the stored checksum against the packet contents
    #[inline]
    pub fn is_corrupted(&self) -> bool {
        checksum::is_corrupted(self)
    }

    /// Mutable access to the payload bytes, for fault injection
    pub fn payload_mut(&mut self) -> &mut [u8; PAYLOAD_SIZE] {
        self.payload.as_bytes_mut()
    }

    /// Serialize packet to bytes (network byte order)
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(PACKET_SIZE);
        buf.put_i32(self.seqnum);
        buf.put_i32(self.acknum);
        buf.put_i32(self.checksum);
        buf.put_slice(self.payload.as_bytes());
        buf.freeze()
    }

    /// Parse packet from bytes (network byte order)
    ///
    /// The checksum is not verified here; see [`Packet::is_corrupted`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < PACKET_SIZE {
            return Err(PacketError::InsufficientData {
                expected: PACKET_SIZE,
                actual: bytes.len(),
            });
        }

        let mut buf = &bytes[..PACKET_SIZE];
        let seqnum = buf.get_i32();
        let acknum = buf.get_i32();
        let checksum = buf.get_i32();
        let mut payload = [0u8; PAYLOAD_SIZE];
        buf.copy_to_slice(&mut payload);

        Ok(Packet {
            seqnum,
            acknum,
            checksum,
            payload: Payload(payload),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::SeqSpace;

    #[test]
    fn test_data_packet_fields() {
        let seq = SeqSpace::for_window(6).seq(5);
        let packet = Packet::data(seq, Payload::filled(b'a'));

        assert_eq!(packet.seqnum, 5);
        assert_eq!(packet.acknum, NOT_IN_USE);
        assert!(!packet.is_corrupted());
    }

    #[test]
    fn test_ack_packet_fields() {
        let packet = Packet::ack_for(3, 1);

        assert_eq!(packet.acknum, 3);
        assert_eq!(packet.seqnum, 1);
        assert_eq!(packet.payload, Payload::filled(b'0'));
        assert!(!packet.is_corrupted());
    }

    #[test]
    fn test_payload_from_slice_pads_and_truncates() {
        let short = Payload::from_slice(b"hi");
        assert_eq!(&short.as_bytes()[..2], b"hi");
        assert!(short.as_bytes()[2..].iter().all(|&b| b == 0));

        let long = Payload::from_slice(&[7u8; 64]);
        assert_eq!(long, Payload::filled(7));
    }

    #[test]
    fn test_encode_decode() {
        let packet = Packet::data(SeqSpace::for_window(6).seq(11), Payload::from_slice(b"hello"));
        let bytes = packet.to_bytes();

        assert_eq!(bytes.len(), PACKET_SIZE);
        assert_eq!(Packet::from_bytes(&bytes).unwrap(), packet);
    }

    #[test]
    fn test_decode_short_frame() {
        let err = Packet::from_bytes(&[0u8; 10]).unwrap_err();
        assert_eq!(
            err,
            PacketError::InsufficientData {
                expected: PACKET_SIZE,
                actual: 10
            }
        );
    }

    #[test]
    fn test_sentinel_survives_encoding() {
        let packet = Packet::data(SeqNum::ZERO, Payload::default());
        let decoded = Packet::from_bytes(&packet.to_bytes()).unwrap();
        assert_eq!(decoded.acknum, NOT_IN_USE);
    }
}
