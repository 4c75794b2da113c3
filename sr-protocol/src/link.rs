//! Boundary between the protocol and its environment
//!
//! The sender and receiver never touch a socket, a clock or an application
//! directly. Each entry point takes a context implementing the traits below;
//! a simulator, a real transport or a test harness supplies them.

use crate::packet::{Packet, Payload};
use std::collections::VecDeque;
use std::time::Duration;

/// Outbound side of the unreliable link
pub trait Link {
    /// Hand a packet to the channel. The channel may drop or corrupt it but
    /// keeps packets from one endpoint in order.
    fn transmit(&mut self, packet: Packet);
}

/// The single retransmission timer of an endpoint
pub trait Timer {
    /// Arm the timer. Starting a timer that is already running violates the
    /// contract.
    fn start_timer(&mut self, timeout: Duration);

    /// Disarm the timer. Must be a no-op when it is not running.
    fn stop_timer(&mut self);
}

/// Consuming application at the receiving endpoint
pub trait Application {
    /// Hand over the next in-order payload
    fn deliver(&mut self, payload: Payload);
}

/// Everything a protocol entry point can ask of its environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Transmit(Packet),
    Deliver(Payload),
    StartTimer(Duration),
    StopTimer,
}

/// In-memory context that records actions instead of performing them
///
/// Useful to drive the protocol by hand: call an entry point, then drain the
/// recorded actions and route them wherever they should go.
#[derive(Debug, Default)]
pub struct Outbox {
    actions: VecDeque<Action>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest recorded action
    pub fn next_action(&mut self) -> Option<Action> {
        self.actions.pop_front()
    }

    /// Take every recorded action, oldest first
    pub fn drain(&mut self) -> Vec<Action> {
        self.actions.drain(..).collect()
    }

    /// Take only the transmitted packets, discarding other actions
    pub fn take_packets(&mut self) -> Vec<Packet> {
        self.drain()
            .into_iter()
            .filter_map(|action| match action {
                Action::Transmit(packet) => Some(packet),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

impl Link for Outbox {
    fn transmit(&mut self, packet: Packet) {
        self.actions.push_back(Action::Transmit(packet));
    }
}

impl Timer for Outbox {
    fn start_timer(&mut self, timeout: Duration) {
        self.actions.push_back(Action::StartTimer(timeout));
    }

    fn stop_timer(&mut self) {
        self.actions.push_back(Action::StopTimer);
    }
}

impl Application for Outbox {
    fn deliver(&mut self, payload: Payload) {
        self.actions.push_back(Action::Deliver(payload));
    }
}
