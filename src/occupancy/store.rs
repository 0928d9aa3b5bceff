//! Occupancy store - double-buffered per-station passenger counts
//!
//! The store always holds exactly one value per graph station, addressed by
//! graph index. A tick reads the front buffer, writes the back buffer, then
//! swaps, so no station ever observes a value written in the same tick.

use crate::core::types::Occupancy;
use crate::network::NetworkGraph;
use super::baseline::Baseline;

#[derive(Debug, Clone)]
pub struct OccupancyStore {
    current: Vec<Occupancy>,
    next: Vec<Occupancy>,
    /// Resolved baseline per station, kept for the background inflow
    baseline: Vec<Occupancy>,
}

impl OccupancyStore {
    /// Seed occupancy from the baseline; stations it does not cover start at 0
    pub fn seeded(graph: &NetworkGraph, baseline: &Baseline) -> Self {
        let resolved = baseline.resolve(graph);
        Self {
            current: resolved.clone(),
            next: vec![0; resolved.len()],
            baseline: resolved,
        }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn get(&self, idx: usize) -> Occupancy {
        self.current[idx]
    }

    pub fn as_slice(&self) -> &[Occupancy] {
        &self.current
    }

    pub fn baseline(&self) -> &[Occupancy] {
        &self.baseline
    }

    pub fn total(&self) -> u64 {
        self.current.iter().map(|&v| v as u64).sum()
    }

    /// Run one simultaneous update: `update(current, baseline, next)` must fill
    /// every slot of `next` from `current` only. The buffers are swapped after.
    pub fn advance<F>(&mut self, update: F)
    where
        F: FnOnce(&[Occupancy], &[Occupancy], &mut [Occupancy]),
    {
        update(&self.current, &self.baseline, &mut self.next);
        std::mem::swap(&mut self.current, &mut self.next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::Location;
    use crate::network::{NetworkBuilder, OrderedLine, StationRecord};

    fn store() -> OccupancyStore {
        let graph = NetworkBuilder::new(&SimulationConfig::default())
            .from_ordered_lines(&[OrderedLine::new(
                "1",
                vec![
                    StationRecord::new("A", Location::default()),
                    StationRecord::new("B", Location::default()),
                ],
            )])
            .unwrap();
        OccupancyStore::seeded(&graph, &Baseline::new().with_name("A", 7))
    }

    #[test]
    fn test_seeded_covers_every_station() {
        let store = store();
        assert_eq!(store.len(), 2);
        assert_eq!(store.as_slice(), &[7, 0]);
        assert_eq!(store.baseline(), &[7, 0]);
        assert_eq!(store.total(), 7);
    }

    #[test]
    fn test_advance_swaps_buffers() {
        let mut store = store();
        store.advance(|current, _, next| {
            // Reverse: each slot reads the other station's pre-update value
            next[0] = current[1];
            next[1] = current[0];
        });
        assert_eq!(store.as_slice(), &[0, 7]);
        // Baseline is unaffected by updates
        assert_eq!(store.baseline(), &[7, 0]);
    }
}
