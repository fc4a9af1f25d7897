//! Capability interface every chain adapter implements.
//!
//! Operations a family cannot express keep the default body and fail with
//! [`ChainError::NotSupported`]; dispatch treats that as an ordinary error.

use async_trait::async_trait;
use serde_json::Value;

use crate::blockchain::models::{ChainError, ChainFamily, Operation};

#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Registry key (lower-case chain name).
    fn chain(&self) -> &str;

    fn family(&self) -> ChainFamily;

    /// Raw JSON-RPC call against this adapter's endpoint.
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ChainError>;

    async fn get_transaction_by_hash(&self, hash: &str) -> Result<Value, ChainError>;

    async fn get_transaction_by_block_hash_and_index(
        &self,
        _block_hash: &str,
        _index: &str,
    ) -> Result<Value, ChainError> {
        Err(self.unsupported("get_transaction_by_block_hash_and_index"))
    }

    async fn get_transaction_by_block_number_and_index(
        &self,
        _block_number: &str,
        _index: &str,
    ) -> Result<Value, ChainError> {
        Err(self.unsupported("get_transaction_by_block_number_and_index"))
    }

    async fn get_block_number(&self) -> Result<Value, ChainError> {
        Err(self.unsupported("get_block_number"))
    }

    async fn get_block_by_hash(&self, _block_hash: &str, _full_tx: bool) -> Result<Value, ChainError> {
        Err(self.unsupported("get_block_by_hash"))
    }

    async fn get_block_by_number(
        &self,
        _block_number: &str,
        _full_tx: bool,
    ) -> Result<Value, ChainError> {
        Err(self.unsupported("get_block_by_number"))
    }

    async fn get_balance(&self, _address: &str, _block: &str) -> Result<Value, ChainError> {
        Err(self.unsupported("get_balance"))
    }

    async fn call(&self, _payload: &Value, _block: &str) -> Result<Value, ChainError> {
        Err(self.unsupported("call"))
    }

    async fn gas_price(&self) -> Result<Value, ChainError> {
        Err(self.unsupported("gas_price"))
    }

    fn unsupported(&self, operation: &str) -> ChainError {
        ChainError::not_supported(operation, self.chain())
    }

    /// Routes one [`Operation`] to the matching method.
    async fn execute(&self, operation: Operation) -> Result<Value, ChainError> {
        match operation {
            Operation::TransactionByHash { hash } => self.get_transaction_by_hash(&hash).await,
            Operation::TransactionByBlockHashAndIndex { block_hash, index } => {
                self.get_transaction_by_block_hash_and_index(&block_hash, &index)
                    .await
            }
            Operation::TransactionByBlockNumberAndIndex {
                block_number,
                index,
            } => {
                self.get_transaction_by_block_number_and_index(&block_number, &index)
                    .await
            }
            Operation::BlockNumber => self.get_block_number().await,
            Operation::BlockByHash {
                block_hash,
                full_tx,
            } => self.get_block_by_hash(&block_hash, full_tx).await,
            Operation::BlockByNumber {
                block_number,
                full_tx,
            } => self.get_block_by_number(&block_number, full_tx).await,
            Operation::Balance { address, block } => self.get_balance(&address, &block).await,
            Operation::Call { payload, block } => self.call(&payload, &block).await,
            Operation::GasPrice => self.gas_price().await,
            Operation::Request {
                family,
                method,
                params,
            } => {
                if family != self.family() {
                    return Err(self.unsupported(&method));
                }
                self.request(&method, params).await
            }
        }
    }
}
