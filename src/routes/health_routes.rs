//! Liveness endpoint.

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Always `OK` while the process serves requests, plus which build and
/// user store backend answered.
async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "service": state.config.logging.service_name,
        "version": state.config.logging.service_version,
        "store": state.store.get_name(),
    }))
}
