//! Mutable per-station occupancy and the baseline that seeds it

pub mod baseline;
pub mod store;

pub use baseline::Baseline;
pub use store::OccupancyStore;
