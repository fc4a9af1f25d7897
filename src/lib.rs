// src/lib.rs

use std::sync::Arc;

use anyhow::{Context, Result};
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

pub mod api;
pub mod blockchain;
pub mod codegen;
pub mod config;
pub mod mcp;
pub mod utils;

use blockchain::{chains::build_registry, client::BlockchainClient, rpc::HttpRpcClient, RpcClient};
use config::Config;
use mcp::tools::Toolbox;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Dispatch layer over the sealed adapter registry
    pub client: BlockchainClient,
    /// Tools served by this process
    pub toolbox: Arc<Toolbox>,
    /// Cancellation handles of running `tools/call` requests, keyed by request id
    pub in_flight: Arc<DashMap<String, CancellationToken>>,
}

impl AppState {
    pub fn new(config: Config, client: BlockchainClient) -> Self {
        let toolbox = Toolbox::for_server(config.server);
        Self {
            config: Arc::new(config),
            client,
            toolbox: Arc::new(toolbox),
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Wires the HTTP transport and registers the chains of the configured
    /// server family.
    pub fn from_config(config: Config) -> Result<Self> {
        let rpc_client: Arc<dyn RpcClient> = Arc::new(
            HttpRpcClient::new(config.rpc_timeout).context("failed to build the HTTP client")?,
        );
        Self::with_rpc_client(config, rpc_client)
    }

    pub fn with_rpc_client(config: Config, rpc_client: Arc<dyn RpcClient>) -> Result<Self> {
        let registry = build_registry(config.server, &config, rpc_client)
            .context("failed to register chain adapters")?;
        let client = BlockchainClient::new(Arc::new(registry));
        Ok(Self::new(config, client))
    }
}
