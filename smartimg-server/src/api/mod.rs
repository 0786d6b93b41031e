//! HTTP surface: router, shared state and handlers.

pub mod endpoints;
pub mod error;
pub mod upload;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;
use crate::storage::UploadDir;

/// Read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub uploads: UploadDir,
}

impl AppState {
    pub fn new(config: ServerConfig, uploads: UploadDir) -> Self {
        Self {
            config: Arc::new(config),
            uploads,
        }
    }
}

/// Build the application router.
///
/// Persisted outputs are served back from the upload directory under `/download/`.
pub fn router(state: AppState) -> Router {
    let downloads = ServeDir::new(state.uploads.root());
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/", get(endpoints::health::root))
        .route("/health", get(endpoints::health::check))
        .route("/analyze", post(endpoints::analysis::analyze))
        .route("/resize", post(endpoints::transform::resize))
        .route("/crop", post(endpoints::transform::crop))
        .route("/enhance", post(endpoints::transform::enhance))
        .route("/filter", post(endpoints::transform::filter))
        .route("/rotate", post(endpoints::transform::rotate))
        .route("/flip", post(endpoints::transform::flip))
        .nest_service("/download", downloads)
        .with_state(state)
        .layer(body_limit)
        .layer(CorsLayer::permissive())
}

pub(crate) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
