//! Station - a stop on one line of the network
//!
//! Stations are the nodes of the network graph. Everything here is static:
//! occupancy lives in the `OccupancyStore`, not on the station.

use serde::{Deserialize, Serialize};

use crate::core::types::{LineId, Location, Occupancy, StationId};

/// A station on a single line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,     // Shared by every platform of a transfer point
    pub line: LineId,
    pub location: Location,
    pub capacity: u32,    // Nominal maximum occupancy, always > 0
}

impl Station {
    pub fn new(
        id: StationId,
        name: impl Into<String>,
        line: LineId,
        location: Location,
        capacity: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            line,
            location,
            capacity,
        }
    }

    /// Headroom left before `occupancy` reaches capacity (zero when full)
    pub fn headroom(&self, occupancy: Occupancy) -> Occupancy {
        self.capacity.saturating_sub(occupancy)
    }

    pub fn is_over_capacity(&self, occupancy: Occupancy) -> bool {
        occupancy > self.capacity
    }
}

/// Derive a station id from its line and name: `"<line>-<slug>"`
pub fn derive_station_id(line: &LineId, name: &str) -> StationId {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            slug.push(ch);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    StationId(format!("{}-{}", line, slug))
}
