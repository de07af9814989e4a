use axum::Json;
use serde::Serialize;

use crate::api::response::JSend;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub health: String,
    pub version: String,
}

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        health: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
