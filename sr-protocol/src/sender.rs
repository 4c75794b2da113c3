//! Selective Repeat send window
//!
//! The sender keeps every transmitted but not yet retired packet in a
//! circular buffer of `window_size` slots. Acknowledgments are per packet:
//! an ack for packet `k` says nothing about the packets before it. Slots are
//! retired only from the front of the window, once contiguous.
//!
//! A single retransmission timer covers the whole window. It is always bound
//! to the oldest unacknowledged packet, and a timeout resends that one packet
//! only.

use crate::config::WindowConfig;
use crate::link::{Link, Timer};
use crate::packet::{Packet, Payload};
use crate::sequence::{SeqNum, SeqSpace};
use thiserror::Error;
use tracing::debug;

/// Send errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SendError {
    #[error("Send window is full ({0} packets outstanding)")]
    WindowFull(usize),
}

/// Sender statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderStats {
    /// Packets transmitted for the first time
    pub packets_sent: u64,
    /// Packets retransmitted after a timeout
    pub packets_resent: u64,
    /// Uncorrupted acknowledgments received
    pub acks_received: u64,
    /// Acknowledgments that marked a packet for the first time
    pub new_acks: u64,
    /// Acknowledgments for packets already marked
    pub duplicate_acks: u64,
    /// Acknowledgments discarded because of a checksum mismatch
    pub corrupted_acks: u64,
    /// Messages refused because the window was full
    pub window_full: u64,
    /// Timer expirations handled
    pub timeouts: u64,
}

/// An occupied send slot
#[derive(Debug, Clone)]
struct Slot {
    packet: Packet,
    acknowledged: bool,
}

/// Sending endpoint (A)
pub struct Sender {
    config: WindowConfig,
    space: SeqSpace,
    /// Circular slot storage, `window_size` long
    slots: Vec<Option<Slot>>,
    /// Index of the oldest occupied slot
    window_first: usize,
    /// Number of occupied slots
    window_count: usize,
    /// Sequence number for the next accepted message
    next_seq: SeqNum,
    /// Packet the running timer is bound to; `None` while stopped
    timer_seq: Option<SeqNum>,
    stats: SenderStats,
}

impl Sender {
    /// Create a sender with an empty window
    pub fn new(config: WindowConfig) -> Self {
        Sender {
            config,
            space: config.seq_space(),
            slots: vec![None; config.window_size()],
            window_first: 0,
            window_count: 0,
            next_seq: SeqNum::ZERO,
            timer_seq: None,
            stats: SenderStats::default(),
        }
    }

    /// Index in `slots` of the slot at `position` from the front
    #[inline]
    fn index(&self, position: usize) -> usize {
        (self.window_first + position) % self.slots.len()
    }

    fn slot(&self, position: usize) -> Option<&Slot> {
        self.slots[self.index(position)].as_ref()
    }

    /// Window position of the slot holding sequence number `raw`
    fn position_of(&self, raw: i32) -> Option<usize> {
        (0..self.window_count)
            .find(|&position| matches!(self.slot(position), Some(slot) if slot.packet.seqnum == raw))
    }

    fn seq_at(&self, position: usize) -> Option<SeqNum> {
        self.slot(position)
            .and_then(|slot| self.space.from_field(slot.packet.seqnum))
    }

    /// Accept one application message
    ///
    /// The message is numbered, transmitted and buffered until acknowledged.
    /// When the window is full nothing is buffered and the caller has to
    /// offer the message again later.
    pub fn submit<C>(&mut self, ctx: &mut C, payload: Payload) -> Result<SeqNum, SendError>
    where
        C: Link + Timer,
    {
        let window_size = self.config.window_size();
        if self.window_count == window_size {
            self.stats.window_full += 1;
            debug!("Send window is full, message refused");
            return Err(SendError::WindowFull(window_size));
        }

        let seq = self.next_seq;
        let packet = Packet::data(seq, payload);
        let idx = self.index(self.window_count);
        self.slots[idx] = Some(Slot {
            packet: packet.clone(),
            acknowledged: false,
        });
        self.window_count += 1;

        debug!("Sending packet {}", seq);
        ctx.transmit(packet);
        self.stats.packets_sent += 1;

        if self.window_count == 1 {
            debug_assert!(self.timer_seq.is_none());
            ctx.start_timer(self.config.rtt());
            self.timer_seq = Some(seq);
        }

        self.next_seq = self.space.next(seq);
        Ok(seq)
    }

    /// Process an acknowledgment from the receiver
    pub fn on_ack<C>(&mut self, ctx: &mut C, packet: &Packet)
    where
        C: Timer,
    {
        if packet.is_corrupted() {
            self.stats.corrupted_acks += 1;
            debug!("Corrupted ACK received, ignored");
            return;
        }
        self.stats.acks_received += 1;

        let ack = packet.acknum;
        let Some(position) = self.position_of(ack) else {
            debug!("ACK {} is outside the send window, ignored", ack);
            return;
        };

        let idx = self.index(position);
        let Some(slot) = self.slots[idx].as_mut() else {
            return;
        };
        if slot.acknowledged {
            self.stats.duplicate_acks += 1;
            debug!("Duplicate ACK {}, ignored", ack);
            return;
        }
        slot.acknowledged = true;
        self.stats.new_acks += 1;
        debug!("ACK {} received", ack);

        if self.timer_seq.map(SeqNum::as_field) == Some(ack) {
            ctx.stop_timer();
            self.timer_seq = None;
            if let Some(next) = self.oldest_unacked() {
                debug!("Timer moved to packet {}", next);
                ctx.start_timer(self.config.rtt());
                self.timer_seq = Some(next);
            }
        }

        let retired = self.slide();
        if retired > 0 {
            debug!("Window slid by {} packet(s)", retired);
        }

        if self.window_count == 0 && self.timer_seq.is_some() {
            ctx.stop_timer();
            self.timer_seq = None;
        }
    }

    /// Handle expiry of the retransmission timer
    ///
    /// Only the packet the timer was bound to is resent.
    pub fn on_timeout<C>(&mut self, ctx: &mut C)
    where
        C: Link + Timer,
    {
        self.stats.timeouts += 1;

        // The timer is no longer running once it has fired.
        let target = self.timer_seq.take();
        let pending = target.and_then(|seq| {
            self.position_of(seq.as_field())
                .filter(|&position| matches!(self.slot(position), Some(slot) if !slot.acknowledged))
                .map(|position| (seq, position))
        });

        match pending {
            Some((seq, position)) => {
                if let Some(slot) = self.slot(position) {
                    debug!("Timeout, resending packet {}", seq);
                    ctx.transmit(slot.packet.clone());
                    self.stats.packets_resent += 1;
                }
                ctx.start_timer(self.config.rtt());
                self.timer_seq = Some(seq);
            }
            None => {
                if let Some(next) = self.oldest_unacked() {
                    debug!("Stale timeout, timer moved to packet {}", next);
                    ctx.start_timer(self.config.rtt());
                    self.timer_seq = Some(next);
                } else {
                    debug!("Stale timeout with nothing outstanding");
                }
            }
        }
    }

    /// Retire acknowledged slots from the front of the window
    fn slide(&mut self) -> usize {
        let mut retired = 0;
        while self.window_count > 0 {
            let idx = self.window_first;
            match &self.slots[idx] {
                Some(slot) if slot.acknowledged => {
                    self.slots[idx] = None;
                    self.window_first = (self.window_first + 1) % self.slots.len();
                    self.window_count -= 1;
                    retired += 1;
                }
                _ => break,
            }
        }
        retired
    }

    /// Oldest packet that has not been acknowledged yet
    pub fn oldest_unacked(&self) -> Option<SeqNum> {
        (0..self.window_count)
            .find(|&position| matches!(self.slot(position), Some(slot) if !slot.acknowledged))
            .and_then(|position| self.seq_at(position))
    }

    /// Number of occupied slots
    pub fn window_count(&self) -> usize {
        self.window_count
    }

    /// Check if no more messages can be accepted right now
    pub fn is_full(&self) -> bool {
        self.window_count == self.config.window_size()
    }

    /// Sequence numbers of the occupied slots, oldest first
    pub fn outstanding(&self) -> Vec<SeqNum> {
        (0..self.window_count)
            .filter_map(|position| self.seq_at(position))
            .collect()
    }

    /// Packet the retransmission timer is bound to
    pub fn timer_target(&self) -> Option<SeqNum> {
        self.timer_seq
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer_seq.is_some()
    }

    /// Sequence number the next accepted message will get
    pub fn next_seq(&self) -> SeqNum {
        self.next_seq
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn stats(&self) -> &SenderStats {
        &self.stats
    }
}
