//! Selective Repeat receive window
//!
//! The receiver buffers up to `window_size` packets ahead of the next
//! expected sequence number and hands payloads to the application strictly
//! in order. Every uncorrupted packet is acknowledged, whether it was
//! buffered, a duplicate, or outside the window: the ack reports receipt,
//! not delivery, so the sender can retire the slot either way.

use crate::config::WindowConfig;
use crate::link::{Application, Link};
use crate::packet::{Packet, Payload};
use crate::sequence::{SeqNum, SeqSpace};
use tracing::debug;

/// Receiver statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Uncorrupted data packets received
    pub packets_received: u64,
    /// Payloads handed to the application
    pub packets_delivered: u64,
    /// Data packets discarded because of a checksum mismatch
    pub corrupted_packets: u64,
    /// In-window packets that were already buffered
    pub duplicate_packets: u64,
    /// Packets outside the receive window
    pub out_of_window: u64,
    /// Acknowledgments transmitted
    pub acks_sent: u64,
}

/// Receiving endpoint (B)
pub struct Receiver {
    config: WindowConfig,
    space: SeqSpace,
    /// Circular slot storage; `slots[base_slot]` holds `expected_base`
    slots: Vec<Option<Payload>>,
    base_slot: usize,
    expected_base: SeqNum,
    /// Alternating seqnum stamped on outgoing acks
    ack_seq: i32,
    stats: ReceiverStats,
}

impl Receiver {
    /// Create a receiver expecting sequence number 0
    pub fn new(config: WindowConfig) -> Self {
        Receiver {
            config,
            space: config.seq_space(),
            slots: vec![None; config.window_size()],
            base_slot: 0,
            expected_base: SeqNum::ZERO,
            ack_seq: 0,
            stats: ReceiverStats::default(),
        }
    }

    /// Process a data packet from the sender
    pub fn on_packet<C>(&mut self, ctx: &mut C, packet: &Packet)
    where
        C: Link + Application,
    {
        if packet.is_corrupted() {
            // No NAK: the sender's timer recovers the packet.
            self.stats.corrupted_packets += 1;
            debug!("Corrupted packet received, ignored");
            return;
        }
        self.stats.packets_received += 1;

        let window_size = self.config.window_size();
        let in_window = self
            .space
            .from_field(packet.seqnum)
            .filter(|&seq| self.space.in_window(self.expected_base, seq, window_size));

        match in_window {
            Some(seq) => {
                let offset = self.space.offset(self.expected_base, seq) as usize;
                let idx = (self.base_slot + offset) % window_size;
                if self.slots[idx].is_some() {
                    self.stats.duplicate_packets += 1;
                    debug!("Packet {} already buffered", seq);
                } else {
                    debug!("Packet {} received", seq);
                    self.slots[idx] = Some(packet.payload);
                    self.deliver_ready(ctx);
                }
            }
            None => {
                self.stats.out_of_window += 1;
                debug!(
                    "Packet {} outside receive window [{}, +{})",
                    packet.seqnum, self.expected_base, window_size
                );
            }
        }

        let ack = Packet::ack_for(packet.seqnum, self.ack_seq);
        self.ack_seq ^= 1;
        debug!("Sending ACK {}", packet.seqnum);
        ctx.transmit(ack);
        self.stats.acks_sent += 1;
    }

    /// Deliver the contiguous run of buffered payloads at the window base
    fn deliver_ready<C>(&mut self, ctx: &mut C) -> usize
    where
        C: Application,
    {
        let mut delivered = 0;
        while let Some(payload) = self.slots[self.base_slot].take() {
            debug!("Delivering packet {}", self.expected_base);
            ctx.deliver(payload);
            self.stats.packets_delivered += 1;
            self.base_slot = (self.base_slot + 1) % self.slots.len();
            self.expected_base = self.space.next(self.expected_base);
            delivered += 1;
        }
        delivered
    }

    /// Next sequence number to be delivered
    pub fn expected_base(&self) -> SeqNum {
        self.expected_base
    }

    /// Number of payloads waiting for a gap to fill
    pub fn buffered(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn stats(&self) -> &ReceiverStats {
        &self.stats
    }
}
