//! Packet integrity code
//!
//! The checksum is a plain integer sum of the header fields and every payload
//! byte. The channel may overwrite header fields or payload bytes but never
//! the stored checksum, so recomputing and comparing is enough to detect the
//! damage.

use crate::packet::Packet;

/// Compute the integrity code of a packet
///
/// The stored `checksum` field does not take part in the sum.
pub fn compute(packet: &Packet) -> i32 {
    packet
        .payload
        .as_bytes()
        .iter()
        .fold(packet.seqnum.wrapping_add(packet.acknum), |sum, &byte| {
            sum.wrapping_add(byte as i32)
        })
}

/// Check whether the packet contents no longer match its stored checksum
#[inline]
pub fn is_corrupted(packet: &Packet) -> bool {
    packet.checksum != compute(packet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{Payload, NOT_IN_USE};

    fn raw(seqnum: i32, acknum: i32, payload: Payload) -> Packet {
        Packet {
            seqnum,
            acknum,
            checksum: 0,
            payload,
        }
    }

    #[test]
    fn test_compute_sums_fields() {
        let packet = raw(3, NOT_IN_USE, Payload::filled(1));
        assert_eq!(compute(&packet), 3 - 1 + 20);
    }

    #[test]
    fn test_bytes_are_unsigned() {
        let packet = raw(0, 0, Payload::filled(0xFF));
        assert_eq!(compute(&packet), 255 * 20);
    }

    #[test]
    fn test_compute_ignores_stored_checksum() {
        let mut packet = raw(4, 2, Payload::from_slice(b"abc"));
        let before = compute(&packet);
        packet.checksum = 12345;
        assert_eq!(compute(&packet), before);
    }

    #[test]
    fn test_detects_payload_overwrite() {
        let mut packet = Packet::ack_for(2, 0);
        assert!(!is_corrupted(&packet));

        packet.payload_mut()[0] = b'Z';
        assert!(is_corrupted(&packet));
    }

    #[test]
    fn test_detects_header_overwrite() {
        let mut packet = Packet::ack_for(2, 0);
        packet.acknum = 999_999;
        assert!(is_corrupted(&packet));

        let mut packet = Packet::ack_for(2, 0);
        packet.seqnum = 999_999;
        assert!(is_corrupted(&packet));
    }
}
