//! Startup registration of the concrete chains.

use std::sync::Arc;

use tracing::info;

use crate::blockchain::{
    evm::EvmAdapter, models::ChainError, registry::AdapterRegistry, rpc::RpcClient,
    solana::SolanaAdapter,
};
use crate::config::{Config, ServerKind};

pub fn register_evm_chains(
    registry: &AdapterRegistry,
    config: &Config,
    rpc_client: Arc<dyn RpcClient>,
) -> Result<(), ChainError> {
    for (chain, url) in config.evm_endpoints() {
        registry.register(chain, Arc::new(EvmAdapter::new(chain, url, rpc_client.clone())))?;
    }
    Ok(())
}

pub fn register_solana_chains(
    registry: &AdapterRegistry,
    config: &Config,
    rpc_client: Arc<dyn RpcClient>,
) -> Result<(), ChainError> {
    for (chain, url) in config.solana_endpoints() {
        registry.register(chain, Arc::new(SolanaAdapter::new(chain, url, rpc_client.clone())))?;
    }
    Ok(())
}

/// Builds and seals the registry for one server family. The pump.fun
/// server talks to Solana, so it gets the Solana adapters.
pub fn build_registry(
    kind: ServerKind,
    config: &Config,
    rpc_client: Arc<dyn RpcClient>,
) -> Result<AdapterRegistry, ChainError> {
    let registry = AdapterRegistry::new();
    match kind {
        ServerKind::Evm => register_evm_chains(&registry, config, rpc_client)?,
        ServerKind::Solana | ServerKind::Pumpfun => {
            register_solana_chains(&registry, config, rpc_client)?
        }
    }
    registry.seal();
    info!(server = %kind, chains = ?registry.list_supported(), "registry sealed");
    Ok(registry)
}
