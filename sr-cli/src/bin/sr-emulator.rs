//! Selective Repeat emulator
//!
//! Runs one sender and one receiver over a simulated lossy, corrupting link
//! and prints the run statistics.

use anyhow::Context;
use clap::Parser;
use sr_cli::{display_config, display_report, Config};
use sr_sim::Emulator;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sr-emulator")]
#[command(about = "Selective Repeat ARQ over an emulated unreliable link", long_about = None)]
struct Args {
    /// Configuration file (TOML, `[simulation]` table)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write an example configuration file and exit
    #[arg(long)]
    example_config: Option<PathBuf>,

    /// Number of messages to simulate
    #[arg(short, long)]
    messages: Option<u64>,

    /// Packet loss probability
    #[arg(short, long)]
    loss: Option<f64>,

    /// Packet corruption probability
    #[arg(long)]
    corrupt: Option<f64>,

    /// Average time between messages from the sender's application
    #[arg(long)]
    lambda: Option<f64>,

    /// Send/receive window size
    #[arg(short, long)]
    window: Option<usize>,

    /// Retransmission timeout
    #[arg(long)]
    rtt: Option<f64>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Some(path) = &args.example_config {
        Config::example()
            .to_file(path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Example configuration written to {}", path.display());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            Config::from_file(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => Config::default(),
    };

    let mut sim = config.simulation.to_sim_config();
    if let Some(messages) = args.messages {
        sim.messages = messages;
    }
    if let Some(loss) = args.loss {
        sim.loss_prob = loss;
    }
    if let Some(corrupt) = args.corrupt {
        sim.corrupt_prob = corrupt;
    }
    if let Some(lambda) = args.lambda {
        sim.lambda = lambda;
    }
    if let Some(window) = args.window {
        sim.window_size = window;
    }
    if let Some(rtt) = args.rtt {
        sim.rtt = rtt;
    }
    if let Some(seed) = args.seed {
        sim.seed = seed;
    }

    display_config(&sim);
    let emulator = Emulator::new(sim).context("invalid simulation parameters")?;
    let report = emulator.run();
    display_report(&report);

    if !report.delivered_in_order() {
        anyhow::bail!("receiver delivered messages out of order");
    }
    if report.completed && !report.is_complete() {
        anyhow::bail!(
            "{} of {} accepted messages were delivered",
            report.delivered.len(),
            report.accepted.len()
        );
    }
    Ok(())
}
