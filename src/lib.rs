//! Metro Occupancy - discrete-time passenger flow over a transit network

pub mod core;
pub mod loader;
pub mod network;
pub mod occupancy;
pub mod presentation;
pub mod server;
pub mod simulation;
