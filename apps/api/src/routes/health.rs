use axum::Json;
use serde_json::{json, Value};

use crate::matching::semantic::ALGORITHM_VERSION;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "hirematch-api",
        "algorithm": ALGORITHM_VERSION
    }))
}
