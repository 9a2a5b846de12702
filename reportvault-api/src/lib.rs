//! # reportvault API server
//!
//! REST API for uploading session reports and retrieving them, consumed by the
//! therapist and patient dashboards.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness check
//! - `POST /api/v1/reports` - Upload a report (multipart: `file`, `sessionId`, `ownerAddress`, `uploadedBy`)
//! - `GET /api/v1/reports?owner=0x...` - List a patient's recorded reports (`owner` required)
//! - `GET /api/v1/reports/<cid>[/<path>]` - Download a report through the gateway
//! - `POST /api/v1/pins` - Pin a single file without metadata
//!
//! ## Example
//!
//! ```rust,ignore
//! use reportvault_api::{ApiServer, ApiConfig};
//!
//! let config = ApiConfig::from_env()?;
//! let server = ApiServer::new(config)?;
//! server.run(([0, 0, 0, 0], 3001)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use reportvault_core::error::Result;

/// API server for reportvault.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a server talking to Pinata with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self {
            state: Arc::new(AppState::new(config)?),
        })
    }

    /// Creates a server around prebuilt state.
    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Creates the router with all routes and layers configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let limit = self.state.config.body_limit_bytes;

        create_router(self.state.clone())
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(limit))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("reportvault API server listening on {}", addr);

        axum::serve(listener, self.router()).await
    }
}
