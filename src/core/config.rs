//! Simulation configuration with documented constants
//!
//! All magic numbers of the transition rule are collected here with
//! explanations of their purpose and how they interact with each other.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{MetroError, Result};

/// Configuration for the occupancy transition rule and network construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === FLOW ===
    /// Fraction of a station's occupancy that moves toward its neighbors per tick
    ///
    /// The moving share is split across neighbors in proportion to their
    /// remaining headroom (capacity - occupancy). When every neighbor is at or
    /// above capacity the share stays where it is.
    pub outflow_rate: f64,

    /// Fraction of a station's occupancy that exits the system per tick
    ///
    /// At 0.05 a crowd with no other input halves in roughly 14 ticks.
    /// `outflow_rate + exit_rate` must not exceed 1.0, otherwise a station
    /// could give away more passengers than it holds.
    pub exit_rate: f64,

    /// Fraction of the station's baseline ridership entering it every tick
    ///
    /// Background ridership keeps occupancy from decaying to zero. The
    /// steady state of an isolated station is `baseline * background_rate / exit_rate`.
    /// The default equals `exit_rate`, so a station sitting at its baseline
    /// gains exactly what exits and network totals hold until flow moves them.
    pub background_rate: f64,

    // === NETWORK ===
    /// Capacity given to stations whose topology record carries none
    pub default_capacity: u32,

    /// Maximum distance between a stop and a line geometry for the stop to be
    /// snapped onto that line (same units as the topology coordinates)
    ///
    /// With UTM input this is meters; stops further away than this from every
    /// line are a topology error.
    pub snap_tolerance: f64,

    // === PARALLELIZATION ===
    /// Minimum station count before the per-tick update runs on the rayon pool
    ///
    /// Real networks (a few hundred stations) stay well below it; the step is
    /// cheaper than the thread handoff at that size.
    pub parallel_threshold: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // Flow (outflow + exit <= 1)
            outflow_rate: 0.10,
            exit_rate: 0.05,
            background_rate: 0.05,

            // Network
            default_capacity: 4000,
            snap_tolerance: 250.0,

            // Parallelization
            parallel_threshold: 1000,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Config with exit and background terms disabled, so a step only moves
    /// passengers between stations
    pub fn mass_preserving() -> Self {
        Self {
            exit_rate: 0.0,
            background_rate: 0.0,
            ..Self::default()
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        for (name, rate) in [
            ("outflow_rate", self.outflow_rate),
            ("exit_rate", self.exit_rate),
            ("background_rate", self.background_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(MetroError::InvalidConfig(format!(
                    "{} ({}) must be within [0, 1]",
                    name, rate
                )));
            }
        }

        if self.outflow_rate + self.exit_rate > 1.0 {
            return Err(MetroError::InvalidConfig(format!(
                "outflow_rate + exit_rate ({:.3}) must not exceed 1.0",
                self.outflow_rate + self.exit_rate
            )));
        }

        if self.default_capacity == 0 {
            return Err(MetroError::InvalidConfig(
                "default_capacity must be positive".into(),
            ));
        }

        if !self.snap_tolerance.is_finite() || self.snap_tolerance < 0.0 {
            return Err(MetroError::InvalidConfig(format!(
                "snap_tolerance ({}) must be a finite non-negative distance",
                self.snap_tolerance
            )));
        }

        Ok(())
    }
}

/// Settings for the HTTP polling and WebSocket push adapters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind: SocketAddr,

    /// Seconds between ticks pushed to WebSocket subscribers
    pub tick_interval_secs: u64,

    /// Per-subscriber queue length; lagging subscribers skip to the newest update
    pub subscriber_buffer: usize,

    /// Whether `GET /events` advances the simulation before answering
    pub step_on_poll: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            tick_interval_secs: 30,
            subscriber_buffer: 16,
            step_on_poll: true,
        }
    }
}

/// Input files for the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Topology description (JSON)
    pub network: PathBuf,
    /// Baseline ridership (JSON), optional
    pub baseline: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            network: PathBuf::from("data/network.json"),
            baseline: Some(PathBuf::from("data/baseline.json")),
        }
    }
}

/// Top-level application config, loaded from TOML
///
/// ```toml
/// [simulation]
/// outflow_rate = 0.1
///
/// [server]
/// tick_interval_secs = 30
///
/// [data]
/// network = "data/network.json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub server: ServerConfig,
    pub data: DataConfig,
}

impl AppConfig {
    /// Parse and validate config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load config from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;

        if self.server.tick_interval_secs == 0 {
            return Err(MetroError::InvalidConfig(
                "server.tick_interval_secs must be at least 1".into(),
            ));
        }
        if self.server.subscriber_buffer == 0 {
            return Err(MetroError::InvalidConfig(
                "server.subscriber_buffer must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
