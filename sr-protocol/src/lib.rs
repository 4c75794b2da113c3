//! Selective Repeat ARQ Protocol Core
//!
//! This crate implements the sender and receiver state machines of a
//! Selective Repeat protocol: sequence numbering, packet format and checksum,
//! the sender's window and single retransmission timer, and the receiver's
//! reassembly buffer. All I/O goes through the traits in [`link`].

pub mod checksum;
pub mod config;
pub mod link;
pub mod packet;
pub mod receiver;
pub mod sender;
pub mod sequence;

pub use config::{ConfigError, WindowConfig, DEFAULT_RTT, DEFAULT_WINDOW_SIZE};
pub use link::{Action, Application, Link, Outbox, Timer};
pub use packet::{Packet, PacketError, Payload, NOT_IN_USE, PACKET_SIZE, PAYLOAD_SIZE};
pub use receiver::{Receiver, ReceiverStats};
pub use sender::{SendError, Sender, SenderStats};
pub use sequence::{SeqNum, SeqSpace};
