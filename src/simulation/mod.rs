//! The occupancy simulation engine
//!
//! `engine` owns the graph and state, `flow` is the transition rule,
//! `shared` is the lock-guarded handle adapters hold.

pub mod engine;
pub mod flow;
pub mod shared;
pub mod snapshot;

pub use engine::SimulationEngine;
pub use flow::FlowRule;
pub use shared::SharedEngine;
pub use snapshot::{StateSnapshot, StationView};
