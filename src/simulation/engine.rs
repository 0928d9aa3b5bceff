//! Simulation engine - owns the network and its occupancy
//!
//! A single synchronous state machine: state is `(tick, occupancy)` and
//! `step` is the only transition. There is no terminal state; callers decide
//! when to stop.

use std::sync::Arc;

use crate::core::config::SimulationConfig;
use crate::core::error::{MetroError, Result};
use crate::core::types::{LineId, Location, Occupancy, StationId, Tick};
use crate::network::{NetworkBuilder, NetworkGraph, TopologySource};
use crate::occupancy::{Baseline, OccupancyStore};
use super::flow::FlowRule;
use super::snapshot::{StateSnapshot, StationView};

pub struct SimulationEngine {
    graph: Arc<NetworkGraph>,
    store: OccupancyStore,
    rule: FlowRule,
    tick: Tick,
}

impl SimulationEngine {
    /// Create an engine over a built graph, seeding occupancy from `baseline`
    pub fn new(graph: NetworkGraph, baseline: &Baseline, config: &SimulationConfig) -> Result<Self> {
        config.validate()?;

        let store = OccupancyStore::seeded(&graph, baseline);
        tracing::info!(
            "Engine ready: {} stations, {} passengers seeded",
            graph.len(),
            store.total()
        );

        Ok(Self {
            graph: Arc::new(graph),
            store,
            rule: FlowRule::from_config(config),
            tick: 0,
        })
    }

    /// Build the graph from a topology source, then create the engine
    pub fn from_topology(
        source: &TopologySource,
        baseline: &Baseline,
        config: &SimulationConfig,
    ) -> Result<Self> {
        config.validate()?;
        let graph = NetworkBuilder::new(config).build(source)?;
        Self::new(graph, baseline, config)
    }

    /// Advance the simulation by one tick
    pub fn step(&mut self) {
        let graph = &self.graph;
        let rule = &self.rule;
        self.store
            .advance(|current, baseline, next| rule.apply(graph, current, baseline, next));
        self.tick += 1;

        tracing::debug!(
            "Tick {}: {} passengers in system",
            self.tick,
            self.store.total()
        );
    }

    /// Lazily step `n` times, yielding the state after each tick.
    ///
    /// Nothing is cached: each item is computed when the iterator is advanced,
    /// and dropping the iterator early leaves the engine at the last tick taken.
    pub fn steps(&mut self, n: usize) -> impl Iterator<Item = StateSnapshot> + '_ {
        (0..n).map(move |_| {
            self.step();
            self.current_state()
        })
    }

    /// Step `n` times and collect the `n` intermediate states in order
    pub fn run_steps(&mut self, n: usize) -> Vec<StateSnapshot> {
        self.steps(n).collect()
    }

    /// Owned snapshot of every station's occupancy
    pub fn current_state(&self) -> StateSnapshot {
        StateSnapshot {
            tick: self.tick,
            occupancy: self
                .graph
                .stations()
                .iter()
                .zip(self.store.as_slice())
                .map(|(station, &occupancy)| (station.id.clone(), occupancy))
                .collect(),
        }
    }

    pub fn connected_stations(&self, id: &str) -> Result<Vec<StationId>> {
        self.graph.connected_stations(id)
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn graph(&self) -> &Arc<NetworkGraph> {
        &self.graph
    }

    pub fn total_occupancy(&self) -> u64 {
        self.store.total()
    }

    pub fn occupancy(&self, id: &str) -> Result<Occupancy> {
        let idx = self.index(id)?;
        Ok(self.store.get(idx))
    }

    pub fn name(&self, id: &str) -> Result<&str> {
        Ok(&self.graph.station_by_id(id)?.name)
    }

    pub fn line(&self, id: &str) -> Result<&LineId> {
        Ok(&self.graph.station_by_id(id)?.line)
    }

    pub fn capacity(&self, id: &str) -> Result<u32> {
        Ok(self.graph.station_by_id(id)?.capacity)
    }

    pub fn location(&self, id: &str) -> Result<Location> {
        Ok(self.graph.station_by_id(id)?.location)
    }

    /// Static attributes, occupancy and neighbors of one station
    pub fn station(&self, id: &str) -> Result<StationView> {
        let idx = self.index(id)?;
        Ok(StationView::new(
            self.graph.station(idx),
            self.store.get(idx),
            self.graph.connected_stations(id)?,
        ))
    }

    /// Stations currently above their nominal capacity
    pub fn congested_stations(&self) -> Vec<StationId> {
        self.graph
            .stations()
            .iter()
            .zip(self.store.as_slice())
            .filter(|(station, &occupancy)| station.is_over_capacity(occupancy))
            .map(|(station, _)| station.id.clone())
            .collect()
    }

    fn index(&self, id: &str) -> Result<usize> {
        self.graph
            .index_of(id)
            .ok_or_else(|| MetroError::UnknownStation(StationId::from(id)))
    }
}
