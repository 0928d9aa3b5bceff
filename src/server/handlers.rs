//! HTTP handlers for the polling API

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use crate::core::error::MetroError;
use crate::core::types::{Occupancy, StationId};
use crate::presentation::{MapView, MAP_PAGE};
use crate::simulation::{StateSnapshot, StationView};
use super::state::AppState;

/// Error body: `{"error": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Wraps engine errors so handlers can return them with `?`
#[derive(Debug)]
pub struct ApiError(pub MetroError);

impl From<MetroError> for ApiError {
    fn from(err: MetroError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_query_error() {
            warn!("Rejected query: {}", self.0);
            StatusCode::NOT_FOUND
        } else {
            error!("Request failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

/// GET `/` - map page
pub async fn index() -> Html<&'static str> {
    Html(MAP_PAGE)
}

/// GET `/events` - advance one tick (when `step_on_poll`) and return
/// `{"<station id>": occupancy}`
pub async fn events(State(state): State<AppState>) -> Json<BTreeMap<StationId, Occupancy>> {
    let snapshot = if state.config.step_on_poll {
        state.engine.step().await
    } else {
        state.engine.current_state()
    };
    Json(snapshot.occupancy.clone())
}

/// GET `/api/state` - latest snapshot, never steps
pub async fn api_state(State(state): State<AppState>) -> Json<StateSnapshot> {
    Json(StateSnapshot::clone(&state.engine.current_state()))
}

/// GET `/api/map` - everything the map page needs for its first draw
pub async fn api_map(State(state): State<AppState>) -> Json<MapView> {
    let snapshot = state.engine.current_state();
    Json(MapView::build(state.engine.graph(), &snapshot))
}

/// GET `/api/stations/:id`
pub async fn station(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StationView>, ApiError> {
    Ok(Json(state.engine.station(&id)?))
}

/// GET `/api/stations/:id/neighbors`
pub async fn neighbors(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<StationId>>, ApiError> {
    Ok(Json(state.engine.connected_stations(&id)?))
}
