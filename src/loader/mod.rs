//! File loaders turning external data into engine inputs

pub mod baseline;
pub mod topology;

pub use baseline::{load_baseline, parse_baseline};
pub use topology::{load_topology, parse_topology};

use crate::core::config::AppConfig;
use crate::core::error::Result;
use crate::occupancy::Baseline;
use crate::simulation::SimulationEngine;

/// Load topology and baseline named in `config` and construct the engine.
///
/// Any failure here is fatal: callers must not start adapters without an engine.
pub fn load_engine(config: &AppConfig) -> Result<SimulationEngine> {
    let source = load_topology(&config.data.network)?;
    let baseline = match &config.data.baseline {
        Some(path) => load_baseline(path)?,
        None => {
            tracing::warn!("No baseline configured, every station starts empty");
            Baseline::new()
        }
    };
    SimulationEngine::from_topology(&source, &baseline, &config.simulation)
}
