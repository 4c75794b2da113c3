//! Unreliable channel model
//!
//! Each transmission is independently lost or corrupted with the configured
//! probabilities. Surviving packets travel as encoded frames and arrive
//! after the last packet already in flight in the same direction, so the
//! channel never reorders.
//!
//! Corruption overwrites part of the encoded frame but never the checksum
//! field:
//!
//! | Share  | Damage                        |
//! |--------|-------------------------------|
//! | 75%    | first payload byte set to `Z` |
//! | 12.5%  | seqnum set to 999999          |
//! | 12.5%  | acknum set to 999999          |

use crate::event::Endpoint;
use crate::time::SimTime;
use bytes::{Bytes, BytesMut};
use rand::Rng;
use sr_protocol::packet::HEADER_SIZE;
use sr_protocol::Packet;
use std::time::Duration;
use tracing::trace;

/// Value written over a corrupted header field
pub const CORRUPT_FIELD: i32 = 999_999;

/// Byte written over a corrupted payload
pub const CORRUPT_BYTE: u8 = b'Z';

const SEQNUM_OFFSET: usize = 0;
const ACKNUM_OFFSET: usize = 4;

/// Minimum one-way delay
const MIN_DELAY: f64 = 1.0;

/// Spread of the uniformly distributed extra delay
const DELAY_SPREAD: f64 = 9.0;

/// Channel statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Packets handed to the channel
    pub transmitted: u64,
    /// Packets dropped
    pub lost: u64,
    /// Packets damaged in transit
    pub corrupted: u64,
}

/// Lossy, corrupting, order-preserving link between A and B
#[derive(Debug)]
pub struct Channel {
    loss_prob: f64,
    corrupt_prob: f64,
    /// Latest scheduled arrival per destination
    last_arrival: [SimTime; 2],
    stats: ChannelStats,
}

impl Channel {
    pub fn new(loss_prob: f64, corrupt_prob: f64) -> Self {
        Channel {
            loss_prob,
            corrupt_prob,
            last_arrival: [SimTime::ZERO; 2],
            stats: ChannelStats::default(),
        }
    }

    /// Send `packet` from `from` to its peer at time `now`
    ///
    /// Returns the arrival time and the (possibly damaged) frame, or `None`
    /// if the packet was lost.
    pub fn transmit<R: Rng>(
        &mut self,
        rng: &mut R,
        now: SimTime,
        from: Endpoint,
        packet: &Packet,
    ) -> Option<(SimTime, Bytes)> {
        self.stats.transmitted += 1;
        let to = from.peer();

        if rng.random::<f64>() < self.loss_prob {
            self.stats.lost += 1;
            trace!("Channel: packet {} -> {} lost", from, to);
            return None;
        }

        let mut frame = BytesMut::from(&packet.to_bytes()[..]);
        if rng.random::<f64>() < self.corrupt_prob {
            self.stats.corrupted += 1;
            let roll = rng.random::<f64>();
            if roll < 0.75 {
                frame[HEADER_SIZE] = CORRUPT_BYTE;
            } else if roll < 0.875 {
                frame[SEQNUM_OFFSET..SEQNUM_OFFSET + 4]
                    .copy_from_slice(&CORRUPT_FIELD.to_be_bytes());
            } else {
                frame[ACKNUM_OFFSET..ACKNUM_OFFSET + 4]
                    .copy_from_slice(&CORRUPT_FIELD.to_be_bytes());
            }
            trace!("Channel: packet {} -> {} corrupted", from, to);
        }

        let delay = MIN_DELAY + DELAY_SPREAD * rng.random::<f64>();
        let departure = now.max(self.last_arrival[to.index()]);
        let arrival = departure + Duration::from_secs_f64(delay);
        self.last_arrival[to.index()] = arrival;

        trace!("Channel: packet {} -> {} arrives at {}", from, to, arrival);
        Some((arrival, frame.freeze()))
    }

    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }
}
