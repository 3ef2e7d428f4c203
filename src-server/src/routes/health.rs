use axum::Json;
use serde_json::{json, Value};

/// GET / - Fixed liveness payload, no authentication.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Grocery backend is running 🚀",
    }))
}
