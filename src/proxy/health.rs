use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};

use crate::proxy::state::RuntimeState;

pub async fn health_check_handler(State(runtime): State<Arc<RuntimeState>>) -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "port": runtime.port,
        "uptime_secs": runtime.started_at.elapsed().as_secs(),
    }))
    .into_response()
}
