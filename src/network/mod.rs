//! Static network topology: stations, lines, adjacency

pub mod builder;
pub mod graph;
pub mod station;
pub mod synthetic;
pub mod topology;

pub use builder::NetworkBuilder;
pub use graph::NetworkGraph;
pub use station::Station;
pub use topology::{LineGeometry, OrderedLine, StationRecord, StopRecord, TopologySource};
