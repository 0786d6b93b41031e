//! Liveness and health endpoints.

use axum::Json;
use serde::Serialize;

use crate::config::{APP_NAME, APP_VERSION};

#[derive(Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub message: String,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// `GET /`: verify the API is running
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "OK",
        message: format!("{APP_NAME} is live!"),
        version: APP_VERSION,
    })
}

/// `GET /health`: probe for deployment monitoring
pub async fn check() -> Json<HealthResponse> {
    tracing::info!("Health check requested");
    Json(HealthResponse { status: "healthy" })
}
