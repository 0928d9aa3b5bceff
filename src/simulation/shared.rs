//! Shared engine handle for concurrent adapters
//!
//! One `SharedEngine` is created at startup and cloned into every adapter.
//! Writers (`step`, `run_steps`) serialize on a single mutex; every completed
//! tick is published through a watch channel, so readers get the latest
//! snapshot without touching the lock. The graph is immutable and shared
//! as-is.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::core::error::Result;
use crate::core::types::{StationId, Tick};
use crate::network::NetworkGraph;
use super::engine::SimulationEngine;
use super::snapshot::{StateSnapshot, StationView};

#[derive(Clone)]
pub struct SharedEngine {
    engine: Arc<Mutex<SimulationEngine>>,
    graph: Arc<NetworkGraph>,
    published: Arc<watch::Sender<Arc<StateSnapshot>>>,
}

impl SharedEngine {
    pub fn new(engine: SimulationEngine) -> Self {
        let graph = Arc::clone(engine.graph());
        let (published, _) = watch::channel(Arc::new(engine.current_state()));
        Self {
            engine: Arc::new(Mutex::new(engine)),
            graph,
            published: Arc::new(published),
        }
    }

    /// Advance one tick and publish the resulting state
    pub async fn step(&self) -> Arc<StateSnapshot> {
        let mut engine = self.engine.lock().await;
        engine.step();
        let snapshot = Arc::new(engine.current_state());
        // Published while still holding the lock so snapshots arrive in tick order
        self.published.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    /// Advance `n` ticks as one uninterrupted batch; publishes the final state
    pub async fn run_steps(&self, n: usize) -> Vec<StateSnapshot> {
        let mut engine = self.engine.lock().await;
        let states = engine.run_steps(n);
        if let Some(last) = states.last() {
            self.published.send_replace(Arc::new(last.clone()));
        }
        states
    }

    /// Latest published snapshot, read without locking the engine
    pub fn current_state(&self) -> Arc<StateSnapshot> {
        Arc::clone(&self.published.borrow())
    }

    pub fn tick(&self) -> Tick {
        self.published.borrow().tick
    }

    /// Receiver notified on every published tick
    pub fn subscribe(&self) -> watch::Receiver<Arc<StateSnapshot>> {
        self.published.subscribe()
    }

    pub fn graph(&self) -> &Arc<NetworkGraph> {
        &self.graph
    }

    pub fn connected_stations(&self, id: &str) -> Result<Vec<StationId>> {
        self.graph.connected_stations(id)
    }

    /// Station attributes joined with the latest published occupancy
    pub fn station(&self, id: &str) -> Result<StationView> {
        let station = self.graph.station_by_id(id)?;
        let occupancy = self.current_state().get(id).unwrap_or(0);
        Ok(StationView::new(station, occupancy, self.graph.connected_stations(id)?))
    }
}
