//! # API Module
//!
//! HTTP surface of the server, mounted under `/api`.
//!
//! ## Available Endpoints
//!
//! - `GET /health` - Liveness and the active server family
//! - `GET /chains` - Registered chain names
//! - `POST /rpc` - MCP JSON-RPC frames, same handler as stdio

pub mod chains;
pub mod health;
pub mod rpc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/chains", get(chains::get_chains_handler))
        .route("/rpc", post(rpc::rpc_handler))
}

/// The full application: API routes under `/api`, request tracing and
/// permissive CORS.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", create_api_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
