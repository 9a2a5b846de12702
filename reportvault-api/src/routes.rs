//! API route configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Reports
        .route(
            "/api/v1/reports",
            get(handlers::list_reports).post(handlers::upload_report),
        )
        .route("/api/v1/reports/*cid", get(handlers::get_report))

        // Bare pins
        .route("/api/v1/pins", post(handlers::pin_file))

        .with_state(state)
}
