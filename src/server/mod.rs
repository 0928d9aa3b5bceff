//! HTTP polling and WebSocket push server
//!
//! Both adapters share one `SharedEngine`: polling clients step it through
//! `/events`, the ticker steps it on a timer while WebSocket subscribers are
//! connected, and the relay pushes every published tick to subscribers.

pub mod handlers;
pub mod state;
pub mod ticker;
pub mod websocket;

pub use state::{AppState, UpdateMessage};

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::core::error::Result;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/events", get(handlers::events))
        .route("/api/state", get(handlers::api_state))
        .route("/api/map", get(handlers::api_map))
        .route("/api/stations/:id", get(handlers::station))
        .route("/api/stations/:id/neighbors", get(handlers::neighbors))
        .route("/ws", get(websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind, start the background tasks and serve until the listener fails
pub async fn serve(state: AppState) -> Result<()> {
    let listener = TcpListener::bind(state.config.bind).await?;
    info!(
        "Serving {} stations on http://{} (push every {}s)",
        state.engine.graph().len(),
        listener.local_addr()?,
        state.config.tick_interval_secs
    );

    let ticker = ticker::spawn_ticker(state.clone());
    let relay = ticker::spawn_relay(state.clone());

    let served = axum::serve(listener, router(state)).await;

    ticker.abort();
    relay.abort();
    served?;
    Ok(())
}
