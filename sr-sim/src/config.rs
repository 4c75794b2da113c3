//! Emulator parameters

use sr_protocol::{ConfigError, WindowConfig};
use std::time::Duration;
use thiserror::Error;

/// Emulator errors
#[derive(Error, Debug, PartialEq)]
pub enum SimError {
    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("Mean time between messages must be positive, got {0}")]
    InvalidLambda(f64),

    #[error("Round-trip time must be positive, got {0}")]
    InvalidRtt(f64),

    #[error("Time limit must be positive, got {0}")]
    InvalidTimeLimit(f64),

    #[error("{name} must be at most {max} time units, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        max: f64,
    },

    #[error("Window configuration error: {0}")]
    Window(#[from] ConfigError),
}

/// Largest accepted value of a time parameter, in time units
///
/// Keeps every scheduled event far inside the range of [`Duration`].
pub const MAX_TIME_UNITS: f64 = 1e12;

/// Parameters of one emulator run
///
/// Times are in simulated time units.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Number of messages the application at A generates
    pub messages: u64,
    /// Probability that a packet is lost
    pub loss_prob: f64,
    /// Probability that a surviving packet is corrupted
    pub corrupt_prob: f64,
    /// Mean time between messages from the application
    pub lambda: f64,
    /// Send and receive window size
    pub window_size: usize,
    /// Retransmission timeout
    pub rtt: f64,
    /// Seed for every random decision of the run
    pub seed: u64,
    /// Simulated time after which the run is abandoned
    pub max_time: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            messages: 20,
            loss_prob: 0.0,
            corrupt_prob: 0.0,
            lambda: 20.0,
            window_size: sr_protocol::DEFAULT_WINDOW_SIZE,
            rtt: 16.0,
            seed: 1234,
            max_time: 1_000_000.0,
        }
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), SimError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::InvalidProbability { name, value })
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn check_range(name: &'static str, value: f64) -> Result<(), SimError> {
    if value <= MAX_TIME_UNITS {
        Ok(())
    } else {
        Err(SimError::OutOfRange {
            name,
            value,
            max: MAX_TIME_UNITS,
        })
    }
}

impl SimConfig {
    /// Check every parameter and derive the protocol window configuration
    pub fn validate(&self) -> Result<WindowConfig, SimError> {
        check_probability("loss_prob", self.loss_prob)?;
        check_probability("corrupt_prob", self.corrupt_prob)?;
        if !positive(self.lambda) {
            return Err(SimError::InvalidLambda(self.lambda));
        }
        if !positive(self.rtt) {
            return Err(SimError::InvalidRtt(self.rtt));
        }
        if !positive(self.max_time) {
            return Err(SimError::InvalidTimeLimit(self.max_time));
        }
        check_range("lambda", self.lambda)?;
        check_range("rtt", self.rtt)?;
        check_range("max_time", self.max_time)?;

        let rtt =
            Duration::try_from_secs_f64(self.rtt).map_err(|_| SimError::InvalidRtt(self.rtt))?;
        Ok(WindowConfig::new(self.window_size, rtt)?)
    }
}
