//! WebSocket push of tick updates

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use super::state::{AppState, UpdateMessage};

/// GET `/ws`
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| push_updates(socket, state))
}

/// Sends the current state once, then every broadcast update until either
/// side closes. Client messages other than Close are ignored.
pub async fn push_updates(socket: WebSocket, state: AppState) {
    // Subscribe before reading the current state so no tick falls in between
    let mut updates = state.updates.subscribe();
    info!("WebSocket subscriber connected ({} total)", state.subscriber_count());

    let (mut sender, mut receiver) = socket.split();

    let snapshot = state.engine.current_state();
    match UpdateMessage::from_snapshot(&snapshot).encode() {
        Ok(text) => {
            if sender.send(Message::Text(text.to_string())).await.is_err() {
                info!("WebSocket closed before first update");
                return;
            }
        }
        Err(err) => warn!("Failed to encode initial state: {err}"),
    }

    let forward = async move {
        loop {
            match updates.recv().await {
                Ok(text) => {
                    if sender.send(Message::Text(text.to_string())).await.is_err() {
                        debug!("WebSocket send failed, dropping subscriber");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("WebSocket subscriber lagged, skipped {skipped} updates");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    let drain = async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    debug!("WebSocket error: {err}");
                    break;
                }
            }
        }
    };

    tokio::select! {
        _ = forward => {},
        _ = drain => {},
    }

    info!("WebSocket subscriber disconnected");
}
