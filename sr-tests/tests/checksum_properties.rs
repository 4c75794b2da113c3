//! Property-based tests for packet integrity
//!
//! Any packet built by the protocol must verify, and changing exactly one
//! header field or one payload byte must always be detected.

use proptest::prelude::*;
use sr_protocol::checksum;
use sr_protocol::{Packet, Payload, WindowConfig, PAYLOAD_SIZE};
use std::time::Duration;

fn payload_strategy() -> impl Strategy<Value = Payload> {
    prop::array::uniform20(any::<u8>()).prop_map(Payload::from)
}

fn data_packet_strategy() -> impl Strategy<Value = Packet> {
    (1usize..64, any::<u32>(), payload_strategy()).prop_map(|(window, seq, payload)| {
        let space = WindowConfig::new(window, Duration::from_secs(16))
            .unwrap()
            .seq_space();
        Packet::data(space.seq(seq), payload)
    })
}

fn ack_packet_strategy() -> impl Strategy<Value = Packet> {
    (0i32..128, 0i32..2).prop_map(|(acknum, seqnum)| Packet::ack_for(acknum, seqnum))
}

fn packet_strategy() -> impl Strategy<Value = Packet> {
    prop_oneof![data_packet_strategy(), ack_packet_strategy()]
}

proptest! {
    #[test]
    fn prop_built_packets_verify(packet in packet_strategy()) {
        prop_assert!(!packet.is_corrupted());
        prop_assert_eq!(packet.checksum, checksum::compute(&packet));
    }

    #[test]
    fn prop_seqnum_tamper_detected(packet in packet_strategy(), value in any::<i32>()) {
        prop_assume!(value != packet.seqnum);
        let mut tampered = packet;
        tampered.seqnum = value;
        prop_assert!(tampered.is_corrupted());
    }

    #[test]
    fn prop_acknum_tamper_detected(packet in packet_strategy(), value in any::<i32>()) {
        prop_assume!(value != packet.acknum);
        let mut tampered = packet;
        tampered.acknum = value;
        prop_assert!(tampered.is_corrupted());
    }

    #[test]
    fn prop_payload_byte_tamper_detected(
        packet in packet_strategy(),
        index in 0..PAYLOAD_SIZE,
        value in any::<u8>(),
    ) {
        prop_assume!(value != packet.payload.as_bytes()[index]);
        let mut tampered = packet;
        tampered.payload_mut()[index] = value;
        prop_assert!(tampered.is_corrupted());
    }

    #[test]
    fn prop_checksum_tamper_detected(packet in packet_strategy(), value in any::<i32>()) {
        prop_assume!(value != packet.checksum);
        let mut tampered = packet;
        tampered.checksum = value;
        prop_assert!(tampered.is_corrupted());
    }

    #[test]
    fn prop_wire_format_preserves_integrity(packet in packet_strategy()) {
        let decoded = Packet::from_bytes(&packet.to_bytes()).unwrap();
        prop_assert!(!decoded.is_corrupted());
        prop_assert_eq!(decoded, packet);
    }
}
