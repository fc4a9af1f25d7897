// src/blockchain/evm.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::blockchain::{
    adapter::ChainAdapter,
    models::{ChainError, ChainFamily},
    rpc::RpcClient,
};
use crate::utils::{parse_u256, to_quantity};

/// Adapter shared by every EVM-compatible chain; only the endpoint differs.
#[derive(Clone)]
pub struct EvmAdapter {
    chain: String,
    rpc_url: String,
    rpc_client: Arc<dyn RpcClient>,
}

impl EvmAdapter {
    pub fn new(chain: &str, rpc_url: &str, rpc_client: Arc<dyn RpcClient>) -> Self {
        Self {
            chain: chain.to_lowercase(),
            rpc_url: rpc_url.to_string(),
            rpc_client,
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait]
impl ChainAdapter for EvmAdapter {
    fn chain(&self) -> &str {
        &self.chain
    }

    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ChainError> {
        self.rpc_client.post(method, params, &self.rpc_url).await
    }

    async fn get_transaction_by_hash(&self, hash: &str) -> Result<Value, ChainError> {
        self.request("eth_getTransactionByHash", vec![json!(hash)])
            .await
    }

    async fn get_transaction_by_block_hash_and_index(
        &self,
        block_hash: &str,
        index: &str,
    ) -> Result<Value, ChainError> {
        let params = vec![json!(block_hash), json!(to_quantity(index)?)];
        self.request("eth_getTransactionByBlockHashAndIndex", params)
            .await
    }

    async fn get_transaction_by_block_number_and_index(
        &self,
        block_number: &str,
        index: &str,
    ) -> Result<Value, ChainError> {
        let params = vec![json!(to_quantity(block_number)?), json!(to_quantity(index)?)];
        self.request("eth_getTransactionByBlockNumberAndIndex", params)
            .await
    }

    async fn get_block_number(&self) -> Result<Value, ChainError> {
        self.request("eth_blockNumber", vec![]).await
    }

    async fn get_block_by_hash(&self, block_hash: &str, full_tx: bool) -> Result<Value, ChainError> {
        self.request("eth_getBlockByHash", vec![json!(block_hash), json!(full_tx)])
            .await
    }

    async fn get_block_by_number(
        &self,
        block_number: &str,
        full_tx: bool,
    ) -> Result<Value, ChainError> {
        let params = vec![json!(to_quantity(block_number)?), json!(full_tx)];
        self.request("eth_getBlockByNumber", params).await
    }

    /// Balance in wei as a decimal string (U256 does not fit a JSON number).
    async fn get_balance(&self, address: &str, block: &str) -> Result<Value, ChainError> {
        let raw = self
            .request("eth_getBalance", vec![json!(address), json!(to_quantity(block)?)])
            .await?;
        let hex = raw.as_str().ok_or_else(|| {
            ChainError::Decode(format!("eth_getBalance returned a non-string result: {}", raw))
        })?;
        let wei = parse_u256(hex)
            .map_err(|_| ChainError::Decode(format!("eth_getBalance returned '{}'", hex)))?;
        Ok(Value::String(wei.to_string()))
    }

    async fn call(&self, payload: &Value, block: &str) -> Result<Value, ChainError> {
        if !payload.is_object() {
            return Err(ChainError::invalid("eth_call payload must be a JSON object"));
        }
        self.request("eth_call", vec![payload.clone(), json!(to_quantity(block)?)])
            .await
    }

    async fn gas_price(&self) -> Result<Value, ChainError> {
        self.request("eth_gasPrice", vec![]).await
    }
}
