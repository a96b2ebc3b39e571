use axum::Json;
use serde_json::{json, Value};

/// Liveness: the process is up and serving.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness. The service holds no connections of its own, so being up is being ready.
pub async fn ready() -> Json<Value> {
    Json(json!({ "status": "ready", "service": env!("CARGO_PKG_NAME") }))
}
