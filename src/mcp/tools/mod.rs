//! Tool surface exposed over MCP.
//!
//! Every tool is a [`ToolSpec`] row: name, description, declared parameters
//! and a [`Handler`]. [`Toolbox::call`] is the only entry point and always
//! yields a [`ToolResult`]; errors never escape it.

pub mod evm_methods;
pub mod params;
pub mod pumpfun;
pub mod semantic;
pub mod solana_methods;
pub mod utilities;

use std::collections::HashMap;

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::blockchain::{
    client::BlockchainClient,
    models::{ChainError, ChainFamily, Operation},
};
use crate::config::ServerKind;
use crate::mcp::protocol::{ToolAnnotations, ToolDefinition, ToolResult};
use crate::utils::{require_string_like, stringify};

use params::{input_schema, ParamSpec, Shape, CHAIN_PARAM};
use pumpfun::PumpTool;
use semantic::Semantic;
use utilities::Utility;

#[derive(Debug, Clone, Copy)]
pub enum Handler {
    /// Pass-through JSON-RPC method; result returned as received.
    Rpc {
        family: ChainFamily,
        method: &'static str,
        shape: Shape,
    },
    Semantic(Semantic),
    Utility(Utility),
    Pumpfun(PumpTool),
    SupportedChains,
}

impl Handler {
    fn takes_chain(&self) -> bool {
        matches!(self, Handler::Rpc { .. } | Handler::Semantic(_))
    }
}

#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
    pub handler: Handler,
}

impl ToolSpec {
    pub fn new(
        name: &'static str,
        title: &'static str,
        description: &'static str,
        params: Vec<ParamSpec>,
        handler: Handler,
    ) -> Self {
        Self {
            name,
            title,
            description,
            params,
            handler,
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        let schema = if self.handler.takes_chain() {
            let mut all = Vec::with_capacity(self.params.len() + 1);
            all.push(CHAIN_PARAM);
            all.extend_from_slice(&self.params);
            input_schema(&all)
        } else {
            input_schema(&self.params)
        };
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: schema,
            annotations: ToolAnnotations {
                title: self.title.to_string(),
                read_only_hint: true,
            },
        }
    }
}

fn supported_chains_tool() -> ToolSpec {
    ToolSpec::new(
        "get_supported_blockchains",
        "Supported blockchains",
        "Returns the list of blockchain names supported by this server.",
        vec![],
        Handler::SupportedChains,
    )
}

/// The tools served by one process.
pub struct Toolbox {
    tools: Vec<ToolSpec>,
    index: HashMap<&'static str, usize>,
}

impl Toolbox {
    pub fn new(tools: Vec<ToolSpec>) -> Self {
        let mut index = HashMap::with_capacity(tools.len());
        for (i, tool) in tools.iter().enumerate() {
            if index.insert(tool.name, i).is_some() {
                warn!(tool = tool.name, "duplicate tool name; later definition wins");
            }
        }
        Self { tools, index }
    }

    pub fn for_server(kind: ServerKind) -> Self {
        let mut tools = Vec::new();
        match kind {
            ServerKind::Evm => {
                tools.extend(evm_methods::tools());
                tools.extend(semantic::tools());
                tools.extend(utilities::evm_tools());
            }
            ServerKind::Solana => {
                tools.extend(solana_methods::tools());
                tools.extend(semantic::tools());
                tools.extend(utilities::solana_tools());
                tools.extend(pumpfun::tools());
            }
            ServerKind::Pumpfun => {
                tools.extend(pumpfun::tools());
                tools.extend(utilities::solana_tools());
            }
        }
        tools.push(supported_chains_tool());
        Self::new(tools)
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(ToolSpec::definition).collect()
    }

    /// Runs a tool and wraps the outcome in the success/error envelope.
    pub async fn call(
        &self,
        name: &str,
        args: &Value,
        client: &BlockchainClient,
        cancel: &CancellationToken,
    ) -> ToolResult {
        let spec = match self.get(name) {
            Some(spec) => spec,
            None => {
                let err = ChainError::invalid(format!("Unknown tool: {}", name));
                return ToolResult::from(&err);
            }
        };

        match run(spec, args, client, cancel).await {
            Ok(text) => {
                debug!(tool = name, "tool call succeeded");
                ToolResult::ok(text)
            }
            Err(err) => {
                warn!(tool = name, kind = err.kind(), error = %err, "tool call failed");
                ToolResult::from(&err)
            }
        }
    }
}

async fn run(
    spec: &ToolSpec,
    args: &Value,
    client: &BlockchainClient,
    cancel: &CancellationToken,
) -> Result<String, ChainError> {
    let empty = json!({});
    let args = match args {
        Value::Null => &empty,
        Value::Object(_) => args,
        other => {
            return Err(ChainError::invalid(format!(
                "Tool arguments must be an object, got {}",
                other
            )))
        }
    };

    match spec.handler {
        Handler::Rpc {
            family,
            method,
            shape,
        } => {
            let chain = chain_arg(args)?;
            let params = shape.build(&spec.params, args)?;
            let operation = Operation::Request {
                family,
                method: method.to_string(),
                params,
            };
            let value = client.invoke_cancellable(&chain, operation, cancel).await?;
            Ok(stringify(&value))
        }
        Handler::Semantic(tool) => {
            let chain = chain_arg(args)?;
            let operation = tool.operation(&spec.params, args)?;
            let value = client.invoke_cancellable(&chain, operation, cancel).await?;
            Ok(stringify(&value))
        }
        Handler::Utility(tool) => tool.run(args),
        Handler::Pumpfun(tool) => tool.run(args),
        Handler::SupportedChains => Ok(Value::from(client.supported_chains()).to_string()),
    }
}

fn chain_arg(args: &Value) -> Result<String, ChainError> {
    Ok(require_string_like(args, "chain")?.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{
        evm::EvmAdapter, registry::AdapterRegistry, rpc::mock::MockRpcClient,
        solana::SolanaAdapter,
    };
    use std::collections::HashSet;
    use std::sync::Arc;

    fn client(mock: Arc<MockRpcClient>) -> BlockchainClient {
        let registry = AdapterRegistry::new();
        registry
            .register("ethereum", Arc::new(EvmAdapter::new("ethereum", "http://eth", mock.clone())))
            .unwrap();
        registry
            .register("solana", Arc::new(SolanaAdapter::new("solana", "http://sol", mock)))
            .unwrap();
        BlockchainClient::new(Arc::new(registry))
    }

    #[test]
    fn tool_names_are_unique_per_server() {
        for kind in [ServerKind::Evm, ServerKind::Solana, ServerKind::Pumpfun] {
            let toolbox = Toolbox::for_server(kind);
            let names: HashSet<_> = toolbox.definitions().into_iter().map(|d| d.name).collect();
            assert_eq!(names.len(), toolbox.len(), "{} has duplicate tools", kind);
            assert!(names.contains("get_supported_blockchains"));
        }
    }

    #[test]
    fn definitions_are_read_only_and_declare_chain() {
        let toolbox = Toolbox::for_server(ServerKind::Evm);
        for def in toolbox.definitions() {
            assert!(def.annotations.read_only_hint, "{}", def.name);
            assert_eq!(def.input_schema["type"], "object");
        }
        let balance = toolbox.get("eth_getBalance").unwrap().definition();
        assert_eq!(balance.input_schema["required"][0], "chain");
        let wei = toolbox.get("convert_hex_wei_to_decimal_eth").unwrap().definition();
        assert!(wei.input_schema["properties"].get("chain").is_none());
    }

    #[tokio::test]
    async fn raw_results_are_stringified() {
        let mock = Arc::new(MockRpcClient::default());
        mock.respond("eth_getBalance", Ok(json!("0x10")));
        let toolbox = Toolbox::for_server(ServerKind::Evm);
        let result = toolbox
            .call(
                "eth_getBalance",
                &json!({"chain": "Ethereum", "address": "0xabc"}),
                &client(mock.clone()),
                &CancellationToken::new(),
            )
            .await;
        assert!(!result.is_error);
        assert_eq!(result.text(), "0x10");
        assert_eq!(mock.last_call().unwrap().1, vec![json!("0xabc"), json!("latest")]);
    }

    #[tokio::test]
    async fn errors_become_envelopes() {
        let mock = Arc::new(MockRpcClient::default());
        let toolbox = Toolbox::for_server(ServerKind::Evm);
        let client = client(mock);
        let cancel = CancellationToken::new();

        let result = toolbox
            .call("eth_chainId", &json!({"chain": "doesnotexist"}), &client, &cancel)
            .await;
        assert!(result.is_error);
        assert!(result.text().contains("doesnotexist"));

        let result = toolbox.call("eth_getBalance", &json!({"chain": "ethereum"}), &client, &cancel).await;
        assert_eq!(result.error_kind.as_deref(), Some("invalid_params"));

        let result = toolbox.call("eth_chainId", &json!([1, 2]), &client, &cancel).await;
        assert!(result.is_error);

        let result = toolbox.call("no_such_tool", &json!({}), &client, &cancel).await;
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn supported_chains_are_sorted_json() {
        let toolbox = Toolbox::for_server(ServerKind::Evm);
        let result = toolbox
            .call(
                "get_supported_blockchains",
                &Value::Null,
                &client(Arc::new(MockRpcClient::default())),
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(result.text(), r#"["ethereum","solana"]"#);
    }
}
