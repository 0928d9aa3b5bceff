pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, ServerConfig, SimulationConfig};
pub use error::{MetroError, Result};
pub use types::{LineId, Location, Occupancy, StationId, Tick};
