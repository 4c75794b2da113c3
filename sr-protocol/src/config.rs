//! Window parameters shared by both endpoints

use crate::sequence::SeqSpace;
use std::time::Duration;
use thiserror::Error;

/// Default number of packets that may be outstanding at once
pub const DEFAULT_WINDOW_SIZE: usize = 6;

/// Default retransmission timeout, in simulated time units
pub const DEFAULT_RTT: Duration = Duration::from_secs(16);

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Window size must be at least 1")]
    EmptyWindow,

    #[error("Window size {0} is too large")]
    WindowTooLarge(usize),

    #[error("Retransmission timeout must be non-zero")]
    ZeroRtt,
}

/// Validated window configuration
///
/// Sender and receiver must be built from the same configuration: the window
/// size fixes both the number of receive slots and the sequence space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    window_size: usize,
    rtt: Duration,
}

impl WindowConfig {
    /// Largest accepted window; keeps every sequence number inside an `i32` field
    pub const MAX_WINDOW_SIZE: usize = 1 << 20;

    pub fn new(window_size: usize, rtt: Duration) -> Result<Self, ConfigError> {
        if window_size == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        if window_size > Self::MAX_WINDOW_SIZE {
            return Err(ConfigError::WindowTooLarge(window_size));
        }
        if rtt.is_zero() {
            return Err(ConfigError::ZeroRtt);
        }
        Ok(WindowConfig { window_size, rtt })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn rtt(&self) -> Duration {
        self.rtt
    }

    /// Sequence space of `2 * window_size` numbers
    pub fn seq_space(&self) -> SeqSpace {
        SeqSpace::for_window(self.window_size)
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            window_size: DEFAULT_WINDOW_SIZE,
            rtt: DEFAULT_RTT,
        }
    }
}
