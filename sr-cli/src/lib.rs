//! Selective Repeat CLI Library
//!
//! Shared functionality for the emulator command-line tool.

pub mod config;
pub mod stats;

pub use config::{Config, ConfigError, SimulationConfig};
pub use stats::{display_config, display_report, format_ratio, format_units};
