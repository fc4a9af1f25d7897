// src/blockchain/solana.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::blockchain::{
    adapter::ChainAdapter,
    models::{ChainError, ChainFamily},
    rpc::RpcClient,
};
use crate::utils::parse_u256;

const COMMITMENTS: [&str; 3] = ["processed", "confirmed", "finalized"];

#[derive(Clone)]
pub struct SolanaAdapter {
    chain: String,
    rpc_url: String,
    rpc_client: Arc<dyn RpcClient>,
}

impl SolanaAdapter {
    pub fn new(chain: &str, rpc_url: &str, rpc_client: Arc<dyn RpcClient>) -> Self {
        Self {
            chain: chain.to_lowercase(),
            rpc_url: rpc_url.to_string(),
            rpc_client,
        }
    }

    fn slot(input: &str) -> Result<u64, ChainError> {
        let value = parse_u256(input)?;
        if value > u64::MAX.into() {
            return Err(ChainError::invalid(format!("slot '{}' is out of range", input)));
        }
        Ok(value.as_u64())
    }
}

#[async_trait]
impl ChainAdapter for SolanaAdapter {
    fn chain(&self) -> &str {
        &self.chain
    }

    fn family(&self) -> ChainFamily {
        ChainFamily::Solana
    }

    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ChainError> {
        self.rpc_client.post(method, params, &self.rpc_url).await
    }

    async fn get_transaction_by_hash(&self, signature: &str) -> Result<Value, ChainError> {
        let params = vec![
            json!(signature),
            json!({"encoding": "base64", "maxSupportedTransactionVersion": 0}),
        ];
        self.request("getTransaction", params).await
    }

    async fn get_block_number(&self) -> Result<Value, ChainError> {
        self.request("getSlot", vec![]).await
    }

    async fn get_block_by_number(
        &self,
        block_number: &str,
        full_tx: bool,
    ) -> Result<Value, ChainError> {
        let details = if full_tx { "full" } else { "signatures" };
        let params = vec![
            json!(Self::slot(block_number)?),
            json!({
                "encoding": "json",
                "maxSupportedTransactionVersion": 0,
                "transactionDetails": details,
            }),
        ];
        self.request("getBlock", params).await
    }

    /// Lamports as an integer, taken from the `value` field of `getBalance`.
    async fn get_balance(&self, address: &str, block: &str) -> Result<Value, ChainError> {
        let mut params = vec![json!(address)];
        let commitment = block.to_ascii_lowercase();
        if COMMITMENTS.contains(&commitment.as_str()) {
            params.push(json!({ "commitment": commitment }));
        }
        let raw = self.request("getBalance", params).await?;
        match raw.get("value") {
            Some(lamports) if lamports.is_u64() => Ok(lamports.clone()),
            _ => Err(ChainError::Decode(format!(
                "getBalance result has no integer 'value': {}",
                raw
            ))),
        }
    }

    async fn call(&self, payload: &Value, _block: &str) -> Result<Value, ChainError> {
        let transaction = payload
            .get("transaction")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ChainError::invalid("Solana call payload needs an encoded 'transaction' string")
            })?;
        let encoding = payload
            .get("encoding")
            .and_then(Value::as_str)
            .unwrap_or("base64");
        let params = vec![json!(transaction), json!({ "encoding": encoding })];
        self.request("simulateTransaction", params).await
    }
}
