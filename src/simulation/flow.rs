//! Flow rule - the per-tick occupancy transition
//!
//! For every station `s`, reading only the pre-tick snapshot `o`:
//!
//! ```text
//! headroom(n)  = max(capacity(n) - o(n), 0)
//! H(s)         = sum of headroom over neighbors of s
//! outflow(s)   = outflow_rate * o(s)   if H(s) > 0, else 0 (retained)
//! share(s->n)  = outflow(s) * headroom(n) / H(s)
//! decay(s)     = min(exit_rate * o(s), o(s))
//! floor(s)     = background_rate * baseline(s)
//! o'(s)        = o(s) - decay(s) - outflow(s) + sum share(m->s) + floor(s)
//! ```
//!
//! `o'` is rounded to the nearest integer and never clamped above capacity.
//! Uses rayon once the network reaches `parallel_threshold` stations.

use rayon::prelude::*;

use crate::core::config::SimulationConfig;
use crate::core::types::Occupancy;
use crate::network::NetworkGraph;

/// What a station sends out this tick, computed in the first pass
#[derive(Debug, Clone, Copy, Default)]
struct Emission {
    outflow: f64,
    /// Total headroom of the receiving neighbors
    headroom_total: f64,
}

/// Capacity-weighted redistribution with exit decay and background inflow
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRule {
    pub outflow_rate: f64,
    pub exit_rate: f64,
    pub background_rate: f64,
    pub parallel_threshold: usize,
}

impl FlowRule {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            outflow_rate: config.outflow_rate,
            exit_rate: config.exit_rate,
            background_rate: config.background_rate,
            parallel_threshold: config.parallel_threshold,
        }
    }

    /// Compute `next` from `current`. Every slot of `next` is overwritten.
    pub fn apply(
        &self,
        graph: &NetworkGraph,
        current: &[Occupancy],
        baseline: &[Occupancy],
        next: &mut [Occupancy],
    ) {
        debug_assert_eq!(current.len(), graph.len());
        debug_assert_eq!(next.len(), graph.len());

        if graph.len() >= self.parallel_threshold {
            self.apply_parallel(graph, current, baseline, next);
        } else {
            self.apply_sequential(graph, current, baseline, next);
        }
    }

    fn apply_sequential(
        &self,
        graph: &NetworkGraph,
        current: &[Occupancy],
        baseline: &[Occupancy],
        next: &mut [Occupancy],
    ) {
        let emissions: Vec<Emission> = (0..graph.len())
            .map(|idx| self.emission(graph, current, idx))
            .collect();

        for (idx, slot) in next.iter_mut().enumerate() {
            *slot = self.settle(graph, current, baseline, &emissions, idx);
        }
    }

    fn apply_parallel(
        &self,
        graph: &NetworkGraph,
        current: &[Occupancy],
        baseline: &[Occupancy],
        next: &mut [Occupancy],
    ) {
        // PARALLEL: both passes only read the pre-tick snapshot
        let emissions: Vec<Emission> = (0..graph.len())
            .into_par_iter()
            .map(|idx| self.emission(graph, current, idx))
            .collect();

        next.par_iter_mut().enumerate().for_each(|(idx, slot)| {
            *slot = self.settle(graph, current, baseline, &emissions, idx);
        });
    }

    fn emission(&self, graph: &NetworkGraph, current: &[Occupancy], idx: usize) -> Emission {
        let headroom_total: f64 = graph
            .neighbors(idx)
            .iter()
            .map(|&n| headroom(graph, current, n))
            .sum();

        // All neighbors saturated (or none at all): nothing leaves
        let outflow = if headroom_total > 0.0 {
            self.outflow_rate * current[idx] as f64
        } else {
            0.0
        };

        Emission {
            outflow,
            headroom_total,
        }
    }

    fn settle(
        &self,
        graph: &NetworkGraph,
        current: &[Occupancy],
        baseline: &[Occupancy],
        emissions: &[Emission],
        idx: usize,
    ) -> Occupancy {
        let occupancy = current[idx] as f64;
        let own_headroom = headroom(graph, current, idx);

        let inflow: f64 = graph
            .neighbors(idx)
            .iter()
            .map(|&m| {
                let sender = emissions[m];
                if sender.headroom_total > 0.0 {
                    sender.outflow * own_headroom / sender.headroom_total
                } else {
                    0.0
                }
            })
            .sum();

        let decay = (self.exit_rate * occupancy).min(occupancy);
        let floor = (self.background_rate * baseline[idx] as f64).max(0.0);
        let value = occupancy - decay - emissions[idx].outflow + inflow + floor;

        debug_assert!(
            value > -1e-6,
            "negative occupancy {} computed for station {}",
            value,
            graph.station(idx).id
        );

        value.max(0.0).round().min(u32::MAX as f64) as u32
    }
}

fn headroom(graph: &NetworkGraph, current: &[Occupancy], idx: usize) -> f64 {
    graph.station(idx).headroom(current[idx]) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Location;
    use crate::network::{NetworkBuilder, OrderedLine, StationRecord};

    fn line_graph(capacities: &[u32]) -> NetworkGraph {
        let stations = capacities
            .iter()
            .enumerate()
            .map(|(i, &cap)| {
                StationRecord::new(format!("S{}", i), Location::new(i as f64, 0.0)).with_capacity(cap)
            })
            .collect();
        NetworkBuilder::new(&SimulationConfig::default())
            .from_ordered_lines(&[OrderedLine::new("1", stations)])
            .unwrap()
    }

    fn rule(outflow: f64, exit: f64, background: f64) -> FlowRule {
        FlowRule {
            outflow_rate: outflow,
            exit_rate: exit,
            background_rate: background,
            parallel_threshold: usize::MAX,
        }
    }

    #[test]
    fn test_outflow_split_by_headroom() {
        // Neighbor 0 has 900 headroom, neighbor 2 has 100
        let graph = line_graph(&[1000, 1000, 100]);
        let current = [100, 1000, 0];
        let mut next = [0; 3];
        rule(0.1, 0.0, 0.0).apply(&graph, &current, &[0; 3], &mut next);

        // Station 1 sends 100: 90 to station 0, 10 to station 2.
        // The ends only border station 1, which is full, so they keep theirs.
        assert_eq!(next[2], 10);
        assert_eq!(next[0], 100 + 90);
        assert_eq!(next[1], 900);
    }

    #[test]
    fn test_outflow_retained_when_neighbors_saturated() {
        let graph = line_graph(&[100, 1000, 100]);
        let current = [150, 500, 100];
        let mut next = [0; 3];
        rule(0.5, 0.0, 0.0).apply(&graph, &current, &[0; 3], &mut next);

        // Both ends are full, so station 1 keeps its outflow while the ends
        // send half of theirs into station 1's headroom.
        assert_eq!(next[1], 500 + 75 + 50);
        assert_eq!(next[0], 75);
        assert_eq!(next[2], 50);
    }

    #[test]
    fn test_isolated_station_keeps_passengers() {
        let graph = line_graph(&[100]);
        let mut next = [0; 1];
        rule(0.5, 0.0, 0.0).apply(&graph, &[80], &[0], &mut next);
        assert_eq!(next[0], 80);
    }

    #[test]
    fn test_decay_and_floor() {
        let graph = line_graph(&[1000]);
        let mut next = [0; 1];
        rule(0.1, 0.1, 0.05).apply(&graph, &[200], &[400], &mut next);
        // 200 - 20 (exit) + 20 (floor)
        assert_eq!(next[0], 200);
    }

    #[test]
    fn test_full_exit_never_negative() {
        let graph = line_graph(&[1000, 1000]);
        let mut next = [0; 2];
        rule(0.0, 1.0, 0.0).apply(&graph, &[999, 1], &[0, 0], &mut next);
        assert_eq!(next, [0, 0]);
    }

    #[test]
    fn test_overcapacity_not_clamped() {
        let graph = line_graph(&[100, 100]);
        let mut next = [0; 2];
        rule(0.1, 0.0, 0.0).apply(&graph, &[5000, 100], &[0, 0], &mut next);
        assert_eq!(next, [5000, 100]);
        assert!(graph.station(0).is_over_capacity(next[0]));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let capacities: Vec<u32> = (0..64).map(|i| 500 + (i * 37) % 900).collect();
        let graph = line_graph(&capacities);
        let current: Vec<u32> = (0..64).map(|i| (i * 131) % 1500).collect();
        let baseline: Vec<u32> = (0..64).map(|i| (i * 71) % 800).collect();

        let sequential = rule(0.1, 0.05, 0.01);
        let parallel = FlowRule {
            parallel_threshold: 1,
            ..sequential.clone()
        };

        let mut a = vec![0; 64];
        let mut b = vec![0; 64];
        sequential.apply(&graph, &current, &baseline, &mut a);
        parallel.apply(&graph, &current, &baseline, &mut b);
        assert_eq!(a, b);
    }
}
