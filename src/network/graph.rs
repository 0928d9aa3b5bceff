//! Network graph - stations, line order and adjacency
//!
//! The graph is immutable once built. Stations are stored densely and
//! addressed internally by index; the id index and the adjacency lists are
//! resolved once by the builder, so queries never match names.

use ahash::AHashMap;

use crate::core::error::{MetroError, Result};
use crate::core::types::{LineId, StationId};
use super::station::Station;

/// Static topology of the network
#[derive(Debug, Clone)]
pub struct NetworkGraph {
    stations: Vec<Station>,
    index: AHashMap<StationId, usize>,
    /// Route order per line, in first-seen line order
    lines: Vec<(LineId, Vec<usize>)>,
    /// Sorted, deduplicated neighbor indices per station
    adjacency: Vec<Vec<usize>>,
}

impl NetworkGraph {
    /// Assemble a graph from already-validated parts.
    ///
    /// The builder guarantees: ids are unique, every line index refers to a
    /// station, adjacency has one sorted list per station without self-loops.
    pub(crate) fn from_parts(
        stations: Vec<Station>,
        index: AHashMap<StationId, usize>,
        lines: Vec<(LineId, Vec<usize>)>,
        adjacency: Vec<Vec<usize>>,
    ) -> Self {
        debug_assert_eq!(stations.len(), adjacency.len());
        debug_assert_eq!(stations.len(), index.len());
        Self {
            stations,
            index,
            lines,
            adjacency,
        }
    }

    /// Number of stations (always at least one)
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn station(&self, idx: usize) -> &Station {
        &self.stations[idx]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Look up a station by id
    pub fn station_by_id(&self, id: &str) -> Result<&Station> {
        self.index_of(id)
            .map(|idx| &self.stations[idx])
            .ok_or_else(|| MetroError::UnknownStation(StationId::from(id)))
    }

    /// Neighbor indices of the station at `idx`
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        &self.adjacency[idx]
    }

    /// Ids of all stations exchanging passengers with `id`: same-line
    /// predecessor and successor plus transfer partners on other lines
    pub fn connected_stations(&self, id: &str) -> Result<Vec<StationId>> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| MetroError::UnknownStation(StationId::from(id)))?;
        Ok(self.adjacency[idx]
            .iter()
            .map(|&n| self.stations[n].id.clone())
            .collect())
    }

    /// Transfer partners only (same name, other line)
    pub fn transfer_partners(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let station = &self.stations[idx];
        self.adjacency[idx].iter().copied().filter(move |&n| {
            let other = &self.stations[n];
            other.line != station.line && other.name == station.name
        })
    }

    pub fn is_transfer(&self, idx: usize) -> bool {
        self.transfer_partners(idx).next().is_some()
    }

    /// Lines in the order they appeared in the topology source
    pub fn lines(&self) -> impl Iterator<Item = &LineId> {
        self.lines.iter().map(|(line, _)| line)
    }

    /// Station indices of `line` in route order
    pub fn line_stations(&self, line: &LineId) -> Option<&[usize]> {
        self.lines
            .iter()
            .find(|(l, _)| l == line)
            .map(|(_, stations)| stations.as_slice())
    }

    /// Every undirected edge once, as `(lower index, higher index)`
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(a, neighbors)| {
                neighbors
                    .iter()
                    .copied()
                    .filter(move |&b| b > a)
                    .map(move |b| (a, b))
            })
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn total_capacity(&self) -> u64 {
        self.stations.iter().map(|s| s.capacity as u64).sum()
    }
}
