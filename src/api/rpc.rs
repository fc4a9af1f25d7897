use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response as HttpResponse},
    Json,
};
use tracing::warn;

use crate::{
    mcp::{
        handler::handle_mcp_request,
        protocol::Request,
    },
    AppState,
};

// Forward JSON-RPC requests over HTTP to the MCP handler. The body is taken
// as raw JSON so malformed frames get a JSON-RPC error instead of a 4xx.
pub async fn rpc_handler(State(state): State<AppState>, body: String) -> HttpResponse {
    let request = match Request::parse(&body) {
        Ok(request) => request,
        Err(resp) => {
            warn!(code = resp.error.as_ref().map(|e| e.code), "rejected JSON-RPC frame");
            return Json(resp).into_response();
        }
    };

    match handle_mcp_request(request, state).await {
        Some(resp) => Json(resp).into_response(),
        // Notifications have no response body.
        None => StatusCode::ACCEPTED.into_response(),
    }
}
