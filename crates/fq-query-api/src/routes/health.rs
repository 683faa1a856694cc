//! Liveness endpoint.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /health: liveness plus the active classifier and validation setup.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let pipeline = &state.pipeline;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "validation": pipeline.executor().validator().kind(),
        "remote_classifier": pipeline.has_remote_classifier(),
    }))
}
