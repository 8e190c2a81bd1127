//! WebAPI - REST/WS endpoints
//!
//! ## Responsibilities
//!
//! - HTTP API routes
//! - WebSocket alert subscription gateway
//! - Response formatting

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::models::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        camera_count: state.cameras.count().await,
        connection_count: state.hub.connection_count().await,
    };

    Json(response)
}
