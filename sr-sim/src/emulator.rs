//! Discrete-event driver for one sender and one receiver
//!
//! The emulator owns both protocol endpoints and feeds them events one at a
//! time: new messages from the application at A, packet arrivals at either
//! end, and expiries of A's timer. Every protocol call runs to completion
//! before the next event is popped.

use crate::channel::{Channel, ChannelStats};
use crate::config::{SimConfig, SimError};
use crate::event::{Endpoint, EventKind, EventQueue};
use crate::time::{SimTime, SimTimer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sr_protocol::{
    Application, Link, Packet, Payload, Receiver, ReceiverStats, SendError, Sender, SenderStats,
    Timer,
};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Outcome of a run
#[derive(Debug, Clone)]
pub struct SimReport {
    /// Simulated time of the last processed event
    pub end_time: SimTime,
    /// Messages produced by the application at A
    pub messages_generated: u64,
    /// Messages the sender accepted, in submission order
    pub accepted: Vec<Payload>,
    /// Payloads handed to the application at B, in delivery order
    pub delivered: Vec<Payload>,
    pub sender: SenderStats,
    pub receiver: ReceiverStats,
    pub channel: ChannelStats,
    /// Timer starts refused because the timer was already running
    pub timer_violations: u64,
    /// False if the run hit the time limit before the event list drained
    pub completed: bool,
}

impl SimReport {
    /// Messages refused at the source because the send window was full
    pub fn messages_dropped(&self) -> u64 {
        self.messages_generated - self.accepted.len() as u64
    }

    /// Check that what was delivered is an in-order prefix of what was sent
    pub fn delivered_in_order(&self) -> bool {
        self.accepted.starts_with(&self.delivered)
    }

    /// Check that every accepted message arrived exactly once, in order
    pub fn is_complete(&self) -> bool {
        self.completed && self.delivered == self.accepted
    }
}

/// Environment shared by both endpoints
struct Network {
    now: SimTime,
    queue: EventQueue,
    channel: Channel,
    timers: [SimTimer; 2],
    rng: StdRng,
    delivered: Vec<Payload>,
    timer_violations: u64,
}

impl Network {
    fn transmit(&mut self, from: Endpoint, packet: &Packet) {
        if let Some((arrival, frame)) = self.channel.transmit(&mut self.rng, self.now, from, packet)
        {
            self.queue.push(
                arrival,
                EventKind::FromNetwork {
                    to: from.peer(),
                    frame,
                },
            );
        }
    }

    fn start_timer(&mut self, endpoint: Endpoint, timeout: Duration) {
        let expiry = self.now + timeout;
        match self.timers[endpoint.index()].arm(expiry) {
            Some(token) => {
                trace!("{}: timer started, expires at {}", endpoint, expiry);
                self.queue
                    .push(expiry, EventKind::TimerExpired { endpoint, token });
            }
            None => {
                self.timer_violations += 1;
                warn!("{}: timer started while already running", endpoint);
            }
        }
    }

    fn stop_timer(&mut self, endpoint: Endpoint) {
        if self.timers[endpoint.index()].cancel() {
            trace!("{}: timer stopped", endpoint);
        }
    }
}

/// Adapter handing one endpoint's requests to the network
struct Port<'a> {
    endpoint: Endpoint,
    net: &'a mut Network,
}

impl Link for Port<'_> {
    fn transmit(&mut self, packet: Packet) {
        self.net.transmit(self.endpoint, &packet);
    }
}

impl Timer for Port<'_> {
    fn start_timer(&mut self, timeout: Duration) {
        self.net.start_timer(self.endpoint, timeout);
    }

    fn stop_timer(&mut self) {
        self.net.stop_timer(self.endpoint);
    }
}

impl Application for Port<'_> {
    fn deliver(&mut self, payload: Payload) {
        trace!("{}: delivered {}", self.endpoint, payload);
        self.net.delivered.push(payload);
    }
}

/// Message produced by the application at A for index `n`
///
/// Twenty copies of one letter, cycling through the alphabet.
pub fn message_for(n: u64) -> Payload {
    Payload::filled(b'a' + (n % 26) as u8)
}

/// Selective Repeat emulator
pub struct Emulator {
    config: SimConfig,
    max_time: SimTime,
    sender: Sender,
    receiver: Receiver,
    net: Network,
    messages_generated: u64,
    accepted: Vec<Payload>,
    completed: bool,
}

impl Emulator {
    /// Create an emulator and schedule the first application message
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let window = config.validate()?;

        let mut emulator = Emulator {
            max_time: SimTime::from_units(config.max_time),
            sender: Sender::new(window),
            receiver: Receiver::new(window),
            net: Network {
                now: SimTime::ZERO,
                queue: EventQueue::new(),
                channel: Channel::new(config.loss_prob, config.corrupt_prob),
                timers: [SimTimer::new(), SimTimer::new()],
                rng: StdRng::seed_from_u64(config.seed),
                delivered: Vec::new(),
                timer_violations: 0,
            },
            messages_generated: 0,
            accepted: Vec::new(),
            completed: false,
            config,
        };

        if emulator.config.messages > 0 {
            emulator.schedule_next_message();
        }
        Ok(emulator)
    }

    /// Inter-arrival time uniform on `[0, 2 * lambda]`
    fn schedule_next_message(&mut self) {
        let gap = 2.0 * self.config.lambda * self.net.rng.random::<f64>();
        let at = self.net.now + Duration::from_secs_f64(gap);
        self.net.queue.push(at, EventKind::FromApplication);
    }

    /// Process the next event
    ///
    /// Returns false once the event list is empty or the time limit is hit.
    pub fn step(&mut self) -> bool {
        match self.net.queue.peek_time() {
            None => {
                self.completed = true;
                return false;
            }
            Some(time) if time > self.max_time => {
                warn!("Time limit {} reached, abandoning run", self.max_time);
                return false;
            }
            Some(_) => {}
        }

        let Some(event) = self.net.queue.pop() else {
            return false;
        };
        self.net.now = event.time;

        match event.kind {
            EventKind::FromApplication => self.on_application_message(),
            EventKind::FromNetwork { to, frame } => {
                let packet = match Packet::from_bytes(&frame) {
                    Ok(packet) => packet,
                    Err(e) => {
                        warn!("{}: undecodable frame dropped: {}", to, e);
                        return true;
                    }
                };
                let mut port = Port {
                    endpoint: to,
                    net: &mut self.net,
                };
                match to {
                    Endpoint::A => self.sender.on_ack(&mut port, &packet),
                    Endpoint::B => self.receiver.on_packet(&mut port, &packet),
                }
            }
            EventKind::TimerExpired { endpoint, token } => {
                if !self.net.timers[endpoint.index()].fire(token) {
                    trace!("{}: stale timer event skipped", endpoint);
                    return true;
                }
                debug!("{}: timer expired at {}", endpoint, self.net.now);
                if endpoint == Endpoint::A {
                    let mut port = Port {
                        endpoint,
                        net: &mut self.net,
                    };
                    self.sender.on_timeout(&mut port);
                }
            }
        }
        true
    }

    fn on_application_message(&mut self) {
        let payload = message_for(self.messages_generated);
        self.messages_generated += 1;

        let mut port = Port {
            endpoint: Endpoint::A,
            net: &mut self.net,
        };
        match self.sender.submit(&mut port, payload) {
            Ok(seq) => {
                trace!("A: message {} accepted as packet {}", payload, seq);
                self.accepted.push(payload);
            }
            Err(SendError::WindowFull(_)) => {
                debug!("A: message {} dropped, window full", payload);
            }
        }

        if self.messages_generated < self.config.messages {
            self.schedule_next_message();
        }
    }

    /// Run until the event list drains or the time limit is reached
    pub fn run(mut self) -> SimReport {
        info!(
            "Starting run: {} messages, loss {}, corruption {}, window {}",
            self.config.messages,
            self.config.loss_prob,
            self.config.corrupt_prob,
            self.config.window_size
        );

        while self.step() {}

        let report = self.into_report();
        info!(
            "Run finished at {}: {} of {} accepted messages delivered",
            report.end_time,
            report.delivered.len(),
            report.accepted.len()
        );
        report
    }

    fn into_report(self) -> SimReport {
        SimReport {
            end_time: self.net.now,
            messages_generated: self.messages_generated,
            accepted: self.accepted,
            delivered: self.net.delivered,
            sender: self.sender.stats().clone(),
            receiver: self.receiver.stats().clone(),
            channel: self.net.channel.stats().clone(),
            timer_violations: self.net.timer_violations,
            completed: self.completed,
        }
    }

    /// Current simulated time
    pub fn now(&self) -> SimTime {
        self.net.now
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// Check if the emulated timer of `endpoint` is armed
    pub fn timer_running(&self, endpoint: Endpoint) -> bool {
        self.net.timers[endpoint.index()].is_running()
    }

    /// Payloads delivered at B so far
    pub fn delivered(&self) -> &[Payload] {
        &self.net.delivered
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_for_cycles_alphabet() {
        assert_eq!(message_for(0), Payload::filled(b'a'));
        assert_eq!(message_for(25), Payload::filled(b'z'));
        assert_eq!(message_for(26), Payload::filled(b'a'));
    }

    #[test]
    fn test_perfect_channel_delivers_everything() {
        let report = Emulator::new(SimConfig {
            messages: 30,
            ..SimConfig::default()
        })
        .unwrap()
        .run();

        assert!(report.completed);
        assert!(report.is_complete());
        assert_eq!(report.channel.lost, 0);
        assert_eq!(report.timer_violations, 0);
        assert_eq!(report.messages_generated, 30);
    }

    #[test]
    fn test_no_messages_finishes_immediately() {
        let report = Emulator::new(SimConfig {
            messages: 0,
            ..SimConfig::default()
        })
        .unwrap()
        .run();

        assert!(report.completed);
        assert!(report.accepted.is_empty());
        assert_eq!(report.end_time, SimTime::ZERO);
    }

    #[test]
    fn test_total_loss_hits_time_limit() {
        let report = Emulator::new(SimConfig {
            messages: 3,
            loss_prob: 1.0,
            max_time: 500.0,
            ..SimConfig::default()
        })
        .unwrap()
        .run();

        assert!(!report.completed);
        assert!(report.delivered.is_empty());
        assert!(report.sender.packets_resent > 0);
        assert!(report.delivered_in_order());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Emulator::new(SimConfig {
            lambda: -1.0,
            ..SimConfig::default()
        });
        assert!(matches!(result, Err(SimError::InvalidLambda(_))));
    }

    #[test]
    fn test_huge_times_rejected() {
        let result = Emulator::new(SimConfig {
            rtt: 1e20,
            ..SimConfig::default()
        });
        assert!(matches!(result, Err(SimError::OutOfRange { name: "rtt", .. })));

        let result = Emulator::new(SimConfig {
            max_time: 1e20,
            ..SimConfig::default()
        });
        assert!(matches!(
            result,
            Err(SimError::OutOfRange { name: "max_time", .. })
        ));
    }

    #[test]
    fn test_sender_timer_mirrors_emulated_timer() {
        let mut emulator = Emulator::new(SimConfig {
            messages: 40,
            loss_prob: 0.2,
            corrupt_prob: 0.2,
            lambda: 5.0,
            ..SimConfig::default()
        })
        .unwrap();

        while emulator.step() {
            let sender = emulator.sender();
            assert_eq!(sender.is_timer_running(), emulator.timer_running(Endpoint::A));
            assert_eq!(sender.timer_target(), sender.oldest_unacked());
        }
    }
}
