//! Baseline ridership used to seed occupancy and the per-tick inflow floor

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Occupancy, StationId};
use crate::network::NetworkGraph;

/// Externally reported ridership, keyed by station id and/or station name.
///
/// Sources usually report by name, which is ambiguous at transfer points;
/// id entries take precedence when both are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    #[serde(default)]
    pub by_id: AHashMap<StationId, u64>,
    #[serde(default)]
    pub by_name: AHashMap<String, u64>,
}

impl Baseline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_by_id(&mut self, id: impl Into<StationId>, ridership: u64) {
        self.by_id.insert(id.into(), ridership);
    }

    pub fn insert_by_name(&mut self, name: impl Into<String>, ridership: u64) {
        self.by_name.insert(name.into(), ridership);
    }

    pub fn with_id(mut self, id: impl Into<StationId>, ridership: u64) -> Self {
        self.insert_by_id(id, ridership);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>, ridership: u64) -> Self {
        self.insert_by_name(name, ridership);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_name.is_empty()
    }

    /// Resolve to one value per station, in graph index order.
    ///
    /// - an id entry applies to that station only
    /// - a name entry is split evenly across every station carrying that
    ///   name; the remainder goes to the earliest of them
    /// - an id entry replaces that station's share of its name entry
    /// - stations matched by neither are 0
    pub fn resolve(&self, graph: &NetworkGraph) -> Vec<Occupancy> {
        let mut values = vec![0 as Occupancy; graph.len()];
        let mut by_id_hit = vec![false; graph.len()];

        for (id, &ridership) in &self.by_id {
            match graph.index_of(id.as_str()) {
                Some(idx) => {
                    values[idx] = clamp_occupancy(ridership);
                    by_id_hit[idx] = true;
                }
                None => tracing::warn!("Baseline id {} matches no station", id),
            }
        }

        if self.by_name.is_empty() {
            return values;
        }

        let mut name_groups: AHashMap<&str, Vec<usize>> = AHashMap::new();
        for (idx, station) in graph.stations().iter().enumerate() {
            name_groups.entry(station.name.as_str()).or_default().push(idx);
        }

        for (name, &ridership) in &self.by_name {
            let Some(group) = name_groups.get(name.as_str()) else {
                tracing::warn!("Baseline name '{}' matches no station", name);
                continue;
            };

            let count = group.len() as u64;
            let share = ridership / count;
            let remainder = ridership % count;
            for (i, &idx) in group.iter().enumerate() {
                if by_id_hit[idx] {
                    continue;
                }
                let extra = u64::from((i as u64) < remainder);
                values[idx] = clamp_occupancy(share + extra);
            }
        }

        values
    }
}

fn clamp_occupancy(value: u64) -> Occupancy {
    Occupancy::try_from(value).unwrap_or(Occupancy::MAX)
}
