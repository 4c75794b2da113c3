//! Hand-driven link between one sender and one receiver
//!
//! Packets sit in per-direction FIFO queues until a test decides their fate.
//! The sender's timer is modelled as a flag so tests can fire it at will and
//! check that it is never started twice.

#![allow(dead_code)]

use sr_protocol::{
    Action, Outbox, Packet, Payload, Receiver, SendError, Sender, SeqNum, WindowConfig,
};
use std::collections::VecDeque;
use std::time::Duration;

/// What happens to the packet at the head of a queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    Deliver,
    Drop,
    Corrupt,
}

pub fn config(window_size: usize) -> WindowConfig {
    WindowConfig::new(window_size, Duration::from_secs(16)).unwrap()
}

/// Distinct payload for message `n`
pub fn message(n: usize) -> Payload {
    Payload::from_slice(format!("message-{:06}", n).as_bytes())
}

pub struct Harness {
    pub sender: Sender,
    pub receiver: Receiver,
    /// Data packets in flight from A to B
    pub to_b: VecDeque<Packet>,
    /// Acknowledgments in flight from B to A
    pub to_a: VecDeque<Packet>,
    pub delivered: Vec<Payload>,
    pub timer_running: bool,
    pub timer_starts: usize,
    pub timer_stops: usize,
    /// Starts requested while the timer was already running
    pub timer_violations: usize,
    outbox: Outbox,
}

impl Harness {
    pub fn new(window_size: usize) -> Self {
        let config = config(window_size);
        Harness {
            sender: Sender::new(config),
            receiver: Receiver::new(config),
            to_b: VecDeque::new(),
            to_a: VecDeque::new(),
            delivered: Vec::new(),
            timer_running: false,
            timer_starts: 0,
            timer_stops: 0,
            timer_violations: 0,
            outbox: Outbox::new(),
        }
    }

    pub fn submit(&mut self, payload: Payload) -> Result<SeqNum, SendError> {
        let result = self.sender.submit(&mut self.outbox, payload);
        self.route_from_a();
        result
    }

    /// Decide the fate of the oldest data packet in flight
    ///
    /// Returns false if nothing was in flight.
    pub fn to_receiver(&mut self, fate: Fate) -> bool {
        let Some(mut packet) = self.to_b.pop_front() else {
            return false;
        };
        match fate {
            Fate::Drop => return true,
            Fate::Corrupt => packet.payload_mut()[0] = b'Z',
            Fate::Deliver => {}
        }
        self.receiver.on_packet(&mut self.outbox, &packet);
        self.route_from_b();
        true
    }

    /// Decide the fate of the oldest acknowledgment in flight
    pub fn to_sender(&mut self, fate: Fate) -> bool {
        let Some(mut packet) = self.to_a.pop_front() else {
            return false;
        };
        match fate {
            Fate::Drop => return true,
            Fate::Corrupt => packet.acknum = 999_999,
            Fate::Deliver => {}
        }
        self.sender.on_ack(&mut self.outbox, &packet);
        self.route_from_a();
        true
    }

    /// Expire the sender's timer
    ///
    /// Returns false if the timer was not running.
    pub fn fire_timer(&mut self) -> bool {
        if !self.timer_running {
            return false;
        }
        self.timer_running = false;
        self.sender.on_timeout(&mut self.outbox);
        self.route_from_a();
        true
    }

    /// Deliver everything in flight in both directions until the link is idle
    pub fn flush(&mut self) {
        while self.to_receiver(Fate::Deliver) || self.to_sender(Fate::Deliver) {}
    }

    /// Fire the timer and flush until nothing is outstanding
    pub fn settle(&mut self) {
        self.flush();
        let mut rounds = 0;
        while self.fire_timer() {
            self.flush();
            rounds += 1;
            assert!(rounds < 10_000, "link never settled");
        }
    }

    fn route_from_a(&mut self) {
        for action in self.outbox.drain() {
            match action {
                Action::Transmit(packet) => self.to_b.push_back(packet),
                Action::StartTimer(_) => {
                    if self.timer_running {
                        self.timer_violations += 1;
                    }
                    self.timer_running = true;
                    self.timer_starts += 1;
                }
                Action::StopTimer => {
                    self.timer_running = false;
                    self.timer_stops += 1;
                }
                Action::Deliver(_) => panic!("sender delivered a payload"),
            }
        }
    }

    fn route_from_b(&mut self) {
        for action in self.outbox.drain() {
            match action {
                Action::Transmit(packet) => self.to_a.push_back(packet),
                Action::Deliver(payload) => self.delivered.push(payload),
                other => panic!("receiver asked for {:?}", other),
            }
        }
    }

    /// Check the single-timer invariant against the sender's own view
    pub fn assert_timer_invariant(&self) {
        assert_eq!(self.timer_violations, 0);
        assert_eq!(self.timer_running, self.sender.window_count() > 0);
        assert_eq!(self.sender.is_timer_running(), self.timer_running);
        assert_eq!(self.sender.timer_target(), self.sender.oldest_unacked());
    }
}
