//! Presentation helpers for map viewers
//!
//! Pure functions of graph + snapshot. Nothing here mutates the engine.

pub mod colors;
pub mod map;

pub use colors::{line_color, marker_radius, CongestionLevel};
pub use map::{Connection, LineView, MapView, StationMarker};

/// Leaflet page served at `/`
pub const MAP_PAGE: &str = include_str!("../../assets/map.html");
