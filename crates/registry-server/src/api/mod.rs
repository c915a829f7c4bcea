//! HTTP API for the application registry

pub mod error;
pub mod handlers;

use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        // Application registry endpoints
        .route("/v1/apps", post(handlers::register_application))
        .route("/v1/apps", get(handlers::list_applications))
        .route("/v1/apps/{id}", get(handlers::get_application))
        .route("/v1/apps/{id}", delete(handlers::deregister_application))
        .route("/v1/apps/{id}/exists", get(handlers::check_if_exists))
        .route("/v1/apps/{id}/challenge", post(handlers::verify_challenge))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
