use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use super::api;
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    let body_limit = state.config().max_body_bytes;

    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        // --- Barcodes ---
        .route("/api/barcodes/archive", post(api::barcodes::create_archive))
        .route("/api/barcodes/preview", post(api::barcodes::preview))
        // --- Middleware ---
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
