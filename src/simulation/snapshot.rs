//! Point-in-time views of engine state handed to callers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{LineId, Location, Occupancy, StationId, Tick};
use crate::network::Station;

/// Occupancy of every station at one tick.
///
/// Owned copy: mutating it never touches the engine. Keys are ordered so the
/// serialized form is stable between identical states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub tick: Tick,
    pub occupancy: BTreeMap<StationId, Occupancy>,
}

impl StateSnapshot {
    pub fn get(&self, id: &str) -> Option<Occupancy> {
        self.occupancy.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.occupancy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupancy.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.occupancy.values().map(|&v| v as u64).sum()
    }
}

/// Static attributes of a station together with its current occupancy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationView {
    pub id: StationId,
    pub name: String,
    pub line: LineId,
    pub location: Location,
    pub capacity: u32,
    pub occupancy: Occupancy,
    pub over_capacity: bool,
    pub neighbors: Vec<StationId>,
}

impl StationView {
    pub fn new(station: &Station, occupancy: Occupancy, neighbors: Vec<StationId>) -> Self {
        Self {
            id: station.id.clone(),
            name: station.name.clone(),
            line: station.line.clone(),
            location: station.location,
            capacity: station.capacity,
            occupancy,
            over_capacity: station.is_over_capacity(occupancy),
            neighbors,
        }
    }
}
