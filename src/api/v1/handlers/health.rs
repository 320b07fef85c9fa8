/*
 * Responsibility
 * - GET /health (疎通用, Public route)
 * - token なしで通ることの確認にも使う
 */
use axum::Json;
use serde_json::{Value, json};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
