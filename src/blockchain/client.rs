//! Dispatch layer.
//!
//! Resolves the adapter for a chain name and forwards one operation to it.
//! Errors pass through untouched; translation happens at the tool boundary.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::blockchain::{
    models::{ChainError, Operation},
    registry::AdapterRegistry,
};

/// Cheap to clone; every clone shares the same registry.
#[derive(Clone)]
pub struct BlockchainClient {
    registry: Arc<AdapterRegistry>,
}

impl BlockchainClient {
    pub fn new(registry: Arc<AdapterRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn supported_chains(&self) -> Vec<String> {
        self.registry.list_supported()
    }

    pub async fn invoke(&self, chain: &str, operation: Operation) -> Result<Value, ChainError> {
        let adapter = self.registry.resolve(chain)?;
        debug!(chain = adapter.chain(), operation = operation.name(), "dispatching");
        adapter.execute(operation).await
    }

    /// Same as [`invoke`](Self::invoke), abandoning the in-flight request when
    /// `cancel` fires. Dropping the future aborts the HTTP call.
    pub async fn invoke_cancellable(
        &self,
        chain: &str,
        operation: Operation,
        cancel: &CancellationToken,
    ) -> Result<Value, ChainError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ChainError::Transport("request cancelled".to_string())),
            result = self.invoke(chain, operation) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{
        evm::EvmAdapter, models::ChainFamily, rpc::mock::MockRpcClient, rpc::RpcClient,
        solana::SolanaAdapter,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;

    fn client_with(mock: Arc<MockRpcClient>) -> BlockchainClient {
        let registry = AdapterRegistry::new();
        registry
            .register("ethereum", Arc::new(EvmAdapter::new("ethereum", "http://eth", mock.clone())))
            .unwrap();
        registry
            .register("solana", Arc::new(SolanaAdapter::new("solana", "http://sol", mock)))
            .unwrap();
        registry.seal();
        BlockchainClient::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn routes_to_the_named_adapter() {
        let mock = Arc::new(MockRpcClient::default());
        let client = client_with(mock.clone());

        client.invoke("Ethereum", Operation::BlockNumber).await.unwrap();
        let (method, _, endpoint) = mock.last_call().unwrap();
        assert_eq!((method.as_str(), endpoint.as_str()), ("eth_blockNumber", "http://eth"));

        client.invoke("SOLANA", Operation::BlockNumber).await.unwrap();
        let (method, _, endpoint) = mock.last_call().unwrap();
        assert_eq!((method.as_str(), endpoint.as_str()), ("getSlot", "http://sol"));
    }

    #[tokio::test]
    async fn returns_the_literal_result_value() {
        let mock = Arc::new(MockRpcClient::default());
        mock.respond("eth_chainId", Ok(json!("0x1")));
        let client = client_with(mock);
        let value = client
            .invoke(
                "ethereum",
                Operation::Request {
                    family: ChainFamily::Evm,
                    method: "eth_chainId".into(),
                    params: vec![],
                },
            )
            .await
            .unwrap();
        assert_eq!(value, json!("0x1"));
    }

    #[tokio::test]
    async fn unsupported_chain_and_capability_gaps_propagate() {
        let client = client_with(Arc::new(MockRpcClient::default()));
        let err = client.invoke("doesnotexist", Operation::GasPrice).await.unwrap_err();
        assert_eq!(err, ChainError::UnsupportedChain("doesnotexist".into()));

        let err = client.invoke("solana", Operation::GasPrice).await.unwrap_err();
        assert_eq!(err.kind(), "not_supported");
    }

    struct StalledClient;

    #[async_trait]
    impl RpcClient for StalledClient {
        async fn post(&self, _: &str, _: Vec<Value>, _: &str) -> Result<Value, ChainError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Value::Null)
        }
    }

    #[tokio::test]
    async fn cancellation_surfaces_as_transport_error() {
        let registry = AdapterRegistry::new();
        registry
            .register("base", Arc::new(EvmAdapter::new("base", "http://base", Arc::new(StalledClient))))
            .unwrap();
        let client = BlockchainClient::new(Arc::new(registry));
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = client
            .invoke_cancellable("base", Operation::GasPrice, &token)
            .await
            .unwrap_err();
        assert_eq!(err, ChainError::Transport("request cancelled".into()));
    }
}
