//! Batch Simulation Runner
//!
//! Runs the engine for a fixed number of ticks and prints every state as JSON.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use metro_occupancy::core::config::AppConfig;
use metro_occupancy::core::error::Result;
use metro_occupancy::loader::load_engine;
use metro_occupancy::network::synthetic::{self, SyntheticConfig};
use metro_occupancy::network::NetworkBuilder;
use metro_occupancy::simulation::SimulationEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One JSON array holding every state
    Json,
    /// One state per line
    Jsonl,
}

/// Batch runner - step the simulation and dump the states
#[derive(Parser, Debug)]
#[command(name = "batch_sim")]
#[command(about = "Run the occupancy simulation for N ticks and print states as JSON")]
struct Args {
    /// Number of ticks to run
    #[arg(long, default_value_t = 10)]
    steps: usize,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use a generated network instead of the configured data files
    #[arg(long)]
    synthetic: bool,

    /// Seed for the generated network
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Include the starting state (tick 0) before the stepped ones
    #[arg(long)]
    include_initial: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metro_occupancy=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = AppConfig::load_or_default(args.config.as_deref())?;

    let mut engine = if args.synthetic {
        let (lines, baseline) = synthetic::generate(&SyntheticConfig {
            seed: args.seed,
            ..SyntheticConfig::default()
        });
        let graph = NetworkBuilder::new(&config.simulation).from_ordered_lines(&lines)?;
        SimulationEngine::new(graph, &baseline, &config.simulation)?
    } else {
        load_engine(&config)?
    };

    let mut states = Vec::with_capacity(args.steps + 1);
    if args.include_initial {
        states.push(engine.current_state());
    }
    states.extend(engine.run_steps(args.steps));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &states)?;
            writeln!(out)?;
        }
        Format::Jsonl => {
            for state in &states {
                serde_json::to_writer(&mut out, state)?;
                writeln!(out)?;
            }
        }
    }

    Ok(())
}
