//! Event list of the emulator
//!
//! Events are popped in time order; events scheduled for the same instant
//! come out in the order they were pushed.

use crate::time::SimTime;
use bytes::Bytes;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

/// One side of the point-to-point link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Sending side
    A,
    /// Receiving side
    B,
}

impl Endpoint {
    /// The other end of the link
    pub fn peer(self) -> Endpoint {
        match self {
            Endpoint::A => Endpoint::B,
            Endpoint::B => Endpoint::A,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Endpoint::A => 0,
            Endpoint::B => 1,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::A => write!(f, "A"),
            Endpoint::B => write!(f, "B"),
        }
    }
}

/// What happens at an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// The application at A has a new message
    FromApplication,
    /// An encoded packet arrives at `to`
    FromNetwork { to: Endpoint, frame: Bytes },
    /// The timer of `endpoint` expires, if `token` is still current
    TimerExpired { endpoint: Endpoint, token: u64 },
}

/// Scheduled event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub time: SimTime,
    pub kind: EventKind,
}

#[derive(Debug)]
struct Scheduled {
    time: SimTime,
    order: u64,
    kind: EventKind,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.order == other.order
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // BinaryHeap is a max-heap; invert so the earliest event is on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Time-ordered event list
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Scheduled>,
    next_order: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event
    pub fn push(&mut self, time: SimTime, kind: EventKind) {
        let order = self.next_order;
        self.next_order += 1;
        self.heap.push(Scheduled { time, order, kind });
    }

    /// Remove the earliest event
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|scheduled| Event {
            time: scheduled.time,
            kind: scheduled.kind,
        })
    }

    /// Time of the earliest event
    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|scheduled| scheduled.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
