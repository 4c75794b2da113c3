//! Selective Repeat Link Emulator
//!
//! This crate drives the protocol endpoints of `sr-protocol` over a
//! simulated unreliable link: a seeded fault model for loss and corruption,
//! a simulated clock, and a time-ordered event list.

pub mod channel;
pub mod config;
pub mod emulator;
pub mod event;
pub mod time;

pub use channel::{Channel, ChannelStats};
pub use config::{SimConfig, SimError, MAX_TIME_UNITS};
pub use emulator::{message_for, Emulator, SimReport};
pub use event::{Endpoint, Event, EventKind, EventQueue};
pub use time::{SimTime, SimTimer};
