//! Shared state handed to every handler

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::core::config::ServerConfig;
use crate::core::error::Result;
use crate::core::types::{Occupancy, StationId, Tick};
use crate::simulation::{SharedEngine, StateSnapshot};

/// Cloned into every handler and background task; clones share the engine,
/// the update channel and the config.
#[derive(Clone)]
pub struct AppState {
    pub engine: SharedEngine,
    /// Encoded update messages for WebSocket subscribers
    pub updates: broadcast::Sender<Arc<str>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(engine: SharedEngine, config: ServerConfig) -> Self {
        let (updates, _) = broadcast::channel(config.subscriber_buffer.max(1));
        Self {
            engine,
            updates,
            config: Arc::new(config),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.updates.receiver_count()
    }
}

/// Message pushed to subscribers after every tick:
/// `{"type":"update","tick":n,"data":{"<id>":occupancy}}`
#[derive(Debug, Serialize)]
pub struct UpdateMessage<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub tick: Tick,
    pub data: &'a BTreeMap<StationId, Occupancy>,
}

impl<'a> UpdateMessage<'a> {
    pub fn from_snapshot(snapshot: &'a StateSnapshot) -> Self {
        Self {
            kind: "update",
            tick: snapshot.tick,
            data: &snapshot.occupancy,
        }
    }

    pub fn encode(&self) -> Result<Arc<str>> {
        Ok(Arc::from(serde_json::to_string(self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_message_shape() {
        let snapshot = StateSnapshot {
            tick: 4,
            occupancy: BTreeMap::from([(StationId::from("1-a"), 120), (StationId::from("1-b"), 7)]),
        };
        let encoded = UpdateMessage::from_snapshot(&snapshot).encode().unwrap();
        assert_eq!(
            &*encoded,
            r#"{"type":"update","tick":4,"data":{"1-a":120,"1-b":7}}"#
        );
    }
}
