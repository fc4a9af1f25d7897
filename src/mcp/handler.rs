//! # MCP Handler Module
//!
//! Implements the Model Context Protocol for the chain RPC servers. Requests
//! arrive as JSON-RPC 2.0 frames (stdio lines or `POST /api/rpc`) and are
//! dispatched here.
//!
//! ## Supported Methods
//!
//! - `initialize`, `ping`
//! - `tools/list`, `tools/call`
//! - `prompts/list`, `prompts/get`
//! - `notifications/*` (no response); `notifications/cancelled` aborts the
//!   matching in-flight `tools/call`

use dashmap::{mapref::entry::Entry, DashMap};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::ServerKind,
    mcp::protocol::{
        error_codes, PromptArgument, PromptDefinition, PromptMessage, Request, Response,
    },
    utils::{get_optional_arg, get_required_arg},
    AppState,
};

pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const REVIEW_TRANSACTION_PROMPT: &str = "review_transaction";

/// This is the main dispatcher for all incoming MCP requests.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    debug!(method = %req.method, id = %req.id, "handling MCP request");

    if req.is_notification() {
        handle_notification(&req, &state);
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req, &state),
        "ping" => Response::success(req.id, json!({})),
        "tools/list" => handle_tools_list(&req, &state),
        "tools/call" => handle_tool_call(req, state).await,
        "prompts/list" => handle_prompts_list(&req),
        "prompts/get" => handle_prompts_get(&req),
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

fn request_key(id: &Value) -> String {
    id.to_string()
}

/// Entry in the in-flight map, removed on drop so an abandoned call (for
/// instance a disconnected HTTP client) does not leave its token behind.
struct InFlight<'a> {
    map: &'a DashMap<String, CancellationToken>,
    key: String,
}

impl<'a> InFlight<'a> {
    /// `None` when another call with the same id is still running; its token
    /// stays in place so it can still be cancelled.
    fn register(
        map: &'a DashMap<String, CancellationToken>,
        id: &Value,
        token: CancellationToken,
    ) -> Option<Self> {
        let key = request_key(id);
        match map.entry(key.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(token);
                Some(Self { map, key })
            }
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.key);
    }
}

fn handle_notification(req: &Request, state: &AppState) {
    match req.method.as_str() {
        "notifications/cancelled" => {
            let target = req
                .params
                .as_ref()
                .and_then(|p| p.get("requestId"))
                .cloned()
                .unwrap_or(Value::Null);
            match state.in_flight.get(&request_key(&target)) {
                Some(token) => {
                    info!(request_id = %target, "cancelling in-flight tool call");
                    token.cancel();
                }
                None => debug!(request_id = %target, "cancel for unknown or finished request"),
            }
        }
        "notifications/initialized" => info!("client initialized"),
        other => debug!(method = other, "ignoring notification"),
    }
}

/// Handles the 'initialize' request.
fn handle_initialize(req: &Request, state: &AppState) -> Response {
    let server = state.config.server;
    let server_info = json!({
        "name": server_name(server),
        "version": env!("CARGO_PKG_VERSION"),
    });
    let capabilities = json!({
        "tools": { "listChanged": false },
        "prompts": { "listChanged": false },
    });

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": capabilities,
            "instructions": instructions(server),
        }),
    )
}

fn server_name(server: ServerKind) -> &'static str {
    match server {
        ServerKind::Evm => "EvmJsonRpcNodeMCP",
        ServerKind::Solana => "SolanaJsonRpcNodeMCP",
        ServerKind::Pumpfun => "PumpfunMCP",
    }
}

fn instructions(server: ServerKind) -> &'static str {
    match server {
        ServerKind::Evm => {
            "Read-only JSON-RPC access to EVM chains. Every chain-bound tool takes a 'chain' \
             argument; call get_supported_blockchains for the accepted names."
        }
        ServerKind::Solana => {
            "Read-only JSON-RPC access to Solana. Method tools take positional arguments \
             param0..paramN, the last one usually being the config object."
        }
        ServerKind::Pumpfun => {
            "Pump.fun bonding curve helpers: derive curve addresses, decode curve accounts \
             fetched with getAccountInfo, and build getProgramAccounts filters."
        }
    }
}

/// Handles the 'tools/list' request.
fn handle_tools_list(req: &Request, state: &AppState) -> Response {
    Response::success(
        req.id.clone(),
        json!({ "tools": state.toolbox.definitions() }),
    )
}

/// Handles a 'tools/call' request. Tool failures come back as a successful
/// JSON-RPC response carrying an error envelope.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };

    let tool_name: String = match get_required_arg(params, "name") {
        Ok(name) => name,
        Err(e) => return Response::error(req.id, error_codes::INVALID_PARAMS, e.to_string()),
    };
    let args = params.get("arguments").cloned().unwrap_or(Value::Null);

    let cancel = CancellationToken::new();
    let Some(_registration) = InFlight::register(&state.in_flight, &req.id, cancel.clone()) else {
        warn!(request_id = %req.id, "request id reused while still in flight");
        return Response::error(
            req.id,
            error_codes::INVALID_REQUEST,
            "Request id is already in flight".into(),
        );
    };

    let result = state
        .toolbox
        .call(&tool_name, &args, &state.client, &cancel)
        .await;

    match serde_json::to_value(&result) {
        Ok(value) => Response::success(req.id, value),
        Err(e) => Response::error(req.id, error_codes::INTERNAL_ERROR, e.to_string()),
    }
}

fn review_transaction_prompt() -> PromptDefinition {
    PromptDefinition {
        name: REVIEW_TRANSACTION_PROMPT.to_string(),
        description: "Analyze a transaction from a Web3 developer perspective.".to_string(),
        arguments: vec![PromptArgument {
            name: "tx_signature".to_string(),
            description: "Transaction hash or signature to review.".to_string(),
            required: true,
        }],
    }
}

fn handle_prompts_list(req: &Request) -> Response {
    Response::success(
        req.id.clone(),
        json!({ "prompts": [review_transaction_prompt()] }),
    )
}

fn handle_prompts_get(req: &Request) -> Response {
    let empty = Value::Null;
    let params = req.params.as_ref().unwrap_or(&empty);
    let name: String = get_optional_arg(params, "name").ok().flatten().unwrap_or_default();
    if name != REVIEW_TRANSACTION_PROMPT {
        return Response::error(
            req.id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Unknown prompt: {}", name),
        );
    }
    let arguments = params.get("arguments").unwrap_or(&empty);
    let signature: String = match get_required_arg(arguments, "tx_signature") {
        Ok(signature) => signature,
        Err(e) => return Response::error(req.id.clone(), error_codes::INVALID_PARAMS, e.to_string()),
    };

    let messages = vec![
        PromptMessage::user(
            "I want you to analyze this transaction from a Web3 developer perspective:",
        ),
        PromptMessage::user(signature),
    ];
    Response::success(
        req.id.clone(),
        json!({
            "description": review_transaction_prompt().description,
            "messages": messages,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{rpc::mock::MockRpcClient, ChainError, RpcClient};
    use crate::config::Config;
    use std::sync::Arc;

    fn state(server: ServerKind, mock: Arc<MockRpcClient>) -> AppState {
        let config = Config {
            server,
            ..Config::default()
        };
        AppState::with_rpc_client(config, mock).unwrap()
    }

    fn request(id: Value, method: &str, params: Value) -> Request {
        Request {
            jsonrpc: "2.0".into(),
            id,
            method: method.into(),
            params: if params.is_null() { None } else { Some(params) },
        }
    }

    #[tokio::test]
    async fn initialize_reports_protocol_and_server() {
        let state = state(ServerKind::Solana, Arc::new(MockRpcClient::default()));
        let resp = handle_mcp_request(request(json!(1), "initialize", Value::Null), state)
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "SolanaJsonRpcNodeMCP");
        assert!(result["capabilities"]["prompts"].is_object());
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let state = state(ServerKind::Evm, Arc::new(MockRpcClient::default()));
        let resp = handle_mcp_request(
            request(Value::Null, "notifications/initialized", Value::Null),
            state,
        )
        .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn unknown_methods_are_rejected() {
        let state = state(ServerKind::Evm, Arc::new(MockRpcClient::default()));
        let resp = handle_mcp_request(request(json!(2), "resources/list", Value::Null), state)
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn tool_call_without_name_is_invalid() {
        let state = state(ServerKind::Evm, Arc::new(MockRpcClient::default()));
        let resp = handle_mcp_request(request(json!(3), "tools/call", json!({})), state)
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn tool_call_wraps_envelope_and_clears_in_flight() {
        let mock = Arc::new(MockRpcClient::default());
        mock.respond("eth_chainId", Ok(json!("0x1")));
        let state = state(ServerKind::Evm, mock);
        let resp = handle_mcp_request(
            request(
                json!(4),
                "tools/call",
                json!({"name": "eth_chainId", "arguments": {"chain": "ethereum"}}),
            ),
            state.clone(),
        )
        .await
        .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], false);
        assert_eq!(result["content"][0]["text"], "0x1");
        assert!(state.in_flight.is_empty());
    }

    #[tokio::test]
    async fn cancelled_notification_trips_the_token() {
        let state = state(ServerKind::Evm, Arc::new(MockRpcClient::default()));
        let token = CancellationToken::new();
        state.in_flight.insert(request_key(&json!("abc")), token.clone());
        let resp = handle_mcp_request(
            request(
                Value::Null,
                "notifications/cancelled",
                json!({"requestId": "abc", "reason": "user"}),
            ),
            state,
        )
        .await;
        assert!(resp.is_none());
        assert!(token.is_cancelled());
    }

    /// Node that never answers.
    struct StalledNode;

    #[async_trait::async_trait]
    impl RpcClient for StalledNode {
        async fn post(&self, _: &str, _: Vec<Value>, _: &str) -> Result<Value, ChainError> {
            std::future::pending().await
        }
    }

    fn stalled_state() -> AppState {
        AppState::with_rpc_client(Config::default(), Arc::new(StalledNode)).unwrap()
    }

    fn chain_id_call(id: Value) -> Request {
        request(
            id,
            "tools/call",
            json!({"name": "eth_chainId", "arguments": {"chain": "ethereum"}}),
        )
    }

    async fn wait_until_in_flight(state: &AppState, id: &Value) {
        while !state.in_flight.contains_key(&request_key(id)) {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn cancelled_notification_ends_a_stalled_call() {
        let state = stalled_state();
        let call = tokio::spawn(handle_mcp_request(chain_id_call(json!(1)), state.clone()));
        wait_until_in_flight(&state, &json!(1)).await;

        // A second call reusing the id is refused and leaves the first cancellable.
        let dup = handle_mcp_request(chain_id_call(json!(1)), state.clone())
            .await
            .unwrap();
        assert_eq!(dup.error.unwrap().code, error_codes::INVALID_REQUEST);

        let notice = handle_mcp_request(
            request(Value::Null, "notifications/cancelled", json!({"requestId": 1})),
            state.clone(),
        )
        .await;
        assert!(notice.is_none());

        let resp = call.await.unwrap().unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("request cancelled"));
        assert!(state.in_flight.is_empty());
    }

    #[tokio::test]
    async fn abandoned_call_leaves_no_in_flight_entry() {
        let state = stalled_state();
        let call = tokio::spawn(handle_mcp_request(chain_id_call(json!(7)), state.clone()));
        wait_until_in_flight(&state, &json!(7)).await;

        call.abort();
        assert!(call.await.unwrap_err().is_cancelled());
        assert!(state.in_flight.is_empty());
    }

    #[tokio::test]
    async fn review_transaction_prompt_messages() {
        let state = state(ServerKind::Evm, Arc::new(MockRpcClient::default()));
        let list = handle_mcp_request(request(json!(5), "prompts/list", Value::Null), state.clone())
            .await
            .unwrap();
        assert_eq!(list.result.unwrap()["prompts"][0]["name"], REVIEW_TRANSACTION_PROMPT);

        let resp = handle_mcp_request(
            request(
                json!(6),
                "prompts/get",
                json!({"name": "review_transaction", "arguments": {"tx_signature": "0xfeed"}}),
            ),
            state.clone(),
        )
        .await
        .unwrap();
        let messages = resp.result.unwrap()["messages"].clone();
        assert_eq!(messages.as_array().unwrap().len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["content"]["text"], "0xfeed");

        let resp = handle_mcp_request(
            request(json!(7), "prompts/get", json!({"name": "review_transaction"})),
            state,
        )
        .await
        .unwrap();
        assert!(resp.error.is_some());
    }
}
