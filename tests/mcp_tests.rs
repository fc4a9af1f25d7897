//! End-to-end tests of the MCP handler: frames in, envelopes out.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use chain_rpc_mcp::{
    blockchain::{ChainError, HttpRpcClient, RpcClient},
    config::{Config, ServerKind},
    mcp::{
        handler::handle_mcp_request,
        protocol::{Request, Response},
    },
    AppState,
};

/// Answers from a fixed table and records the last call.
#[derive(Default)]
struct StubNode {
    answers: HashMap<&'static str, Result<Value, ChainError>>,
    last: Mutex<Option<(String, Vec<Value>)>>,
}

impl StubNode {
    fn with(mut self, method: &'static str, answer: Result<Value, ChainError>) -> Self {
        self.answers.insert(method, answer);
        self
    }
}

#[async_trait]
impl RpcClient for StubNode {
    async fn post(
        &self,
        method: &str,
        params: Vec<Value>,
        _endpoint: &str,
    ) -> Result<Value, ChainError> {
        *self.last.lock().unwrap() = Some((method.to_string(), params));
        self.answers
            .get(method)
            .cloned()
            .unwrap_or_else(|| Err(ChainError::Transport(format!("no stub for {}", method))))
    }
}

fn state(server: ServerKind, node: Arc<dyn RpcClient>) -> AppState {
    let config = Config {
        server,
        ..Config::default()
    };
    AppState::with_rpc_client(config, node).unwrap()
}

async fn call_tool(state: &AppState, name: &str, arguments: Value) -> Value {
    let request = Request {
        jsonrpc: "2.0".into(),
        id: json!(1),
        method: "tools/call".into(),
        params: Some(json!({"name": name, "arguments": arguments})),
    };
    let response: Response = handle_mcp_request(request, state.clone()).await.unwrap();
    assert!(response.error.is_none(), "tool errors must not be JSON-RPC errors");
    response.result.unwrap()
}

#[tokio::test]
async fn tools_list_matches_server_family() {
    let node: Arc<dyn RpcClient> = Arc::new(StubNode::default());
    for (server, present, absent) in [
        (ServerKind::Evm, "eth_getBalance", "getbalance"),
        (ServerKind::Solana, "getbalance", "eth_getBalance"),
        (ServerKind::Pumpfun, "calculate_bonding_curve_address", "getbalance"),
    ] {
        let state = state(server, node.clone());
        let request: Request =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 9, "method": "tools/list"}))
                .unwrap();
        let result = handle_mcp_request(request, state).await.unwrap().result.unwrap();
        let names: Vec<&str> = result["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&present), "{} lacks {}", server, present);
        assert!(!names.contains(&absent), "{} has {}", server, absent);
        assert!(names.contains(&"get_supported_blockchains"));
    }
}

#[tokio::test]
async fn unsupported_chain_yields_error_envelope() {
    let state = state(ServerKind::Evm, Arc::new(StubNode::default()));
    let result = call_tool(&state, "eth_blockNumber", json!({"chain": "doesnotexist"})).await;
    assert_eq!(result["isError"], true);
    assert_eq!(
        result["content"][0]["text"],
        "Unsupported blockchain: doesnotexist"
    );
}

#[tokio::test]
async fn chain_names_are_case_insensitive() {
    let node = StubNode::default().with("eth_blockNumber", Ok(json!("0x10")));
    let state = state(ServerKind::Evm, Arc::new(node));
    for chain in ["ethereum", "Ethereum", "ETHEREUM", "Binance Smart Chain"] {
        let result = call_tool(&state, "eth_blockNumber", json!({"chain": chain})).await;
        assert_eq!(result["isError"], false, "{}", chain);
        assert_eq!(result["content"][0]["text"], "0x10");
    }
}

#[tokio::test]
async fn rpc_error_text_carries_code_and_message() {
    let node = StubNode::default().with(
        "eth_call",
        Err(ChainError::Rpc {
            code: -32000,
            message: "execution reverted".into(),
        }),
    );
    let state = state(ServerKind::Evm, Arc::new(node));
    let result = call_tool(
        &state,
        "eth_call",
        json!({"chain": "base", "to_address": "0x01", "data": "0x"}),
    )
    .await;
    assert_eq!(result["isError"], true);
    assert_eq!(result["errorKind"], "rpc");
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("-32000") && text.contains("execution reverted"));
}

#[tokio::test]
async fn solana_balance_scenarios() {
    let node = Arc::new(StubNode::default().with(
        "getBalance",
        Ok(json!({"context": {"slot": 300000000}, "value": 1500000000u64})),
    ));
    let state = state(ServerKind::Solana, node.clone());

    let result = call_tool(
        &state,
        "getbalance",
        json!({"chain": "solana", "param0": "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM"}),
    )
    .await;
    assert_eq!(result["isError"], false);
    let body: Value = serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(body["value"], 1500000000u64);
    let (method, params) = node.last.lock().unwrap().clone().unwrap();
    assert_eq!(method, "getBalance");
    assert_eq!(params.len(), 1);

    let result = call_tool(
        &state,
        "getbalance",
        json!({"chain": "solana", "param0": "not-a-valid-pubkey"}),
    )
    .await;
    assert_eq!(result["isError"], true);
    assert_eq!(result["errorKind"], "invalid_params");
}

#[tokio::test]
async fn every_chain_tool_fails_softly_on_unknown_chain() {
    for server in [ServerKind::Evm, ServerKind::Solana] {
        let state = state(server, Arc::new(StubNode::default()));
        let tools = state.toolbox.definitions();
        for tool in tools {
            let takes_chain = tool.input_schema["properties"].get("chain").is_some();
            let args = if takes_chain {
                json!({"chain": "doesnotexist"})
            } else {
                json!({})
            };
            let result = call_tool(&state, &tool.name, args).await;
            if takes_chain || tool.input_schema["required"].as_array().map_or(false, |r| !r.is_empty()) {
                assert_eq!(result["isError"], true, "{} on {}", tool.name, server);
            }
        }
    }
}

#[tokio::test]
async fn pumpfun_tools_run_locally() {
    let state = state(ServerKind::Pumpfun, Arc::new(StubNode::default()));
    let result = call_tool(
        &state,
        "calculate_associated_bonding_curve_address",
        json!({"mint": "So11111111111111111111111111111111111111112"}),
    )
    .await;
    assert_eq!(result["isError"], false);
    assert_eq!(
        result["content"][0]["text"],
        "5ADoevzZMUvkzywQpnZVjWoqGvGAmghzs1jQmMpwj1GD"
    );

    let result = call_tool(&state, "get_supported_blockchains", json!({})).await;
    assert_eq!(result["content"][0]["text"], r#"["solana"]"#);
}

#[tokio::test]
async fn http_transport_against_stubbed_node() {
    let mut server = mockito::Server::new_async().await;
    let balance = server
        .mock("POST", "/")
        .match_body(mockito::Matcher::PartialJson(
            json!({"method": "eth_getBalance"}),
        ))
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0xde0b6b3a7640000"}"#)
        .create_async()
        .await;
    let failing = server
        .mock("POST", "/")
        .match_body(mockito::Matcher::PartialJson(json!({"method": "eth_gasPrice"})))
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"boom"}}"#)
        .create_async()
        .await;

    let config = Config {
        ethereum_rpc_url: server.url(),
        ..Config::default()
    };
    let transport: Arc<dyn RpcClient> =
        Arc::new(HttpRpcClient::new(Duration::from_secs(5)).unwrap());
    let state = AppState::with_rpc_client(config, transport).unwrap();

    let result = call_tool(
        &state,
        "get_balance",
        json!({"chain": "ethereum", "address": "0x00000000219ab540356cBB839Cbe05303d7705Fa"}),
    )
    .await;
    assert_eq!(result["isError"], false);
    assert_eq!(result["content"][0]["text"], "1000000000000000000");

    let result = call_tool(&state, "get_gas_fees", json!({"chain": "ethereum"})).await;
    assert_eq!(result["isError"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("-32000") && text.contains("boom"));

    balance.assert_async().await;
    failing.assert_async().await;
}
