use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ChainsOutput {
    pub server: &'static str,
    pub chains: Vec<String>,
}

// GET /chains: the registered chain names, sorted.
pub async fn get_chains_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(ChainsOutput {
        server: state.config.server.as_str(),
        chains: state.client.supported_chains(),
    })
}
