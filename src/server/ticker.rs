//! Background tasks feeding WebSocket subscribers
//!
//! The ticker advances the engine on a fixed interval while anyone is
//! listening. The relay encodes every published snapshot, whoever stepped it,
//! and broadcasts it.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::core::types::Tick;
use super::state::{AppState, UpdateMessage};

/// Step once if there is at least one subscriber. Returns the new tick.
pub async fn tick_once(state: &AppState) -> Option<Tick> {
    if state.subscriber_count() == 0 {
        debug!("No subscribers, skipping tick");
        return None;
    }
    Some(state.engine.step().await.tick)
}

pub fn spawn_ticker(state: AppState) -> JoinHandle<()> {
    let period = Duration::from_secs(state.config.tick_interval_secs.max(1));
    tokio::spawn(async move {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick of a tokio interval fires immediately
        timer.tick().await;
        loop {
            timer.tick().await;
            tick_once(&state).await;
        }
    })
}

pub fn spawn_relay(state: AppState) -> JoinHandle<()> {
    let mut published = state.engine.subscribe();
    tokio::spawn(async move {
        while published.changed().await.is_ok() {
            let snapshot = published.borrow_and_update().clone();
            if state.subscriber_count() == 0 {
                continue;
            }
            match UpdateMessage::from_snapshot(&snapshot).encode() {
                // Fails only when the last subscriber left in between
                Ok(text) => {
                    let _ = state.updates.send(text);
                }
                Err(err) => warn!("Failed to encode tick {}: {err}", snapshot.tick),
            }
        }
    })
}
