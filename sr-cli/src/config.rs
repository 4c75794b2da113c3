//! Configuration file support for the emulator CLI

use serde::{Deserialize, Serialize};
use sr_sim::SimConfig;
use std::fs;
use std::path::Path;

/// `[simulation]` table of the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of messages to simulate
    #[serde(default = "default_messages")]
    pub messages: u64,
    /// Packet loss probability
    #[serde(default)]
    pub loss: f64,
    /// Packet corruption probability
    #[serde(default)]
    pub corrupt: f64,
    /// Average time between messages from the sender's application
    #[serde(default = "default_lambda")]
    pub lambda: f64,
    /// Send/receive window size
    #[serde(default = "default_window")]
    pub window: usize,
    /// Retransmission timeout
    #[serde(default = "default_rtt")]
    pub rtt: f64,
    /// Random seed
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Simulated time limit
    #[serde(default = "default_max_time")]
    pub max_time: f64,
}

fn default_messages() -> u64 {
    SimConfig::default().messages
}

fn default_lambda() -> f64 {
    SimConfig::default().lambda
}

fn default_window() -> usize {
    SimConfig::default().window_size
}

fn default_rtt() -> f64 {
    SimConfig::default().rtt
}

fn default_seed() -> u64 {
    SimConfig::default().seed
}

fn default_max_time() -> f64 {
    SimConfig::default().max_time
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig::from(&SimConfig::default())
    }
}

impl From<&SimConfig> for SimulationConfig {
    fn from(config: &SimConfig) -> Self {
        SimulationConfig {
            messages: config.messages,
            loss: config.loss_prob,
            corrupt: config.corrupt_prob,
            lambda: config.lambda,
            window: config.window_size,
            rtt: config.rtt,
            seed: config.seed,
            max_time: config.max_time,
        }
    }
}

impl SimulationConfig {
    /// Convert to emulator parameters
    pub fn to_sim_config(&self) -> SimConfig {
        SimConfig {
            messages: self.messages,
            loss_prob: self.loss,
            corrupt_prob: self.corrupt,
            lambda: self.lambda,
            window_size: self.window,
            rtt: self.rtt,
            seed: self.seed,
            max_time: self.max_time,
        }
    }
}

/// Combined configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Example configuration with a lossy, corrupting link
    pub fn example() -> Self {
        Config {
            simulation: SimulationConfig {
                messages: 1000,
                loss: 0.2,
                corrupt: 0.2,
                lambda: 10.0,
                ..SimulationConfig::default()
            },
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
