// src/blockchain/models.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// --- Error taxonomy shared by transport, adapters, registry and dispatch ---

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("Unsupported blockchain: {0}")]
    UnsupportedChain(String),
    #[error("Operation '{operation}' is not supported for {chain}")]
    NotSupported { operation: String, chain: String },
    #[error("RPC Error ({code}): {message}")]
    Rpc { code: i64, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
    #[error("Adapter registry is sealed; cannot register '{0}'")]
    RegistrySealed(String),
}

impl ChainError {
    pub fn not_supported(operation: impl Into<String>, chain: impl Into<String>) -> Self {
        ChainError::NotSupported {
            operation: operation.into(),
            chain: chain.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ChainError::InvalidParams(message.into())
    }

    /// Stable machine-readable kind, surfaced next to the text message.
    pub fn kind(&self) -> &'static str {
        match self {
            ChainError::UnsupportedChain(_) => "unsupported_chain",
            ChainError::NotSupported { .. } => "not_supported",
            ChainError::Rpc { .. } => "rpc",
            ChainError::Transport(_) => "transport",
            ChainError::Decode(_) => "decode",
            ChainError::InvalidParams(_) => "invalid_params",
            ChainError::RegistrySealed(_) => "registry_sealed",
        }
    }
}

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChainError::Transport(format!("request timed out: {}", err))
        } else if err.is_decode() {
            ChainError::Decode(err.to_string())
        } else {
            ChainError::Transport(err.to_string())
        }
    }
}

// --- Chain families ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Evm,
    Solana,
}

impl std::fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainFamily::Evm => write!(f, "evm"),
            ChainFamily::Solana => write!(f, "solana"),
        }
    }
}

// --- JSON-RPC 2.0 wire types (upstream node) ---

/// Outbound request envelope. Built fresh per call, never retained.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: &'a [Value],
    pub id: u64,
}

impl<'a> RpcRequest<'a> {
    pub fn new(method: &'a str, params: &'a [Value]) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default = "default_error_code")]
    pub code: i64,
    #[serde(default = "default_error_message")]
    pub message: String,
}

fn default_error_code() -> i64 {
    -1
}

fn default_error_message() -> String {
    "Unknown RPC error".to_string()
}

impl From<RpcErrorObject> for ChainError {
    fn from(err: RpcErrorObject) -> Self {
        ChainError::Rpc {
            code: err.code,
            message: err.message,
        }
    }
}

// --- Semantic operations routed by the dispatch layer ---

/// One adapter operation together with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    TransactionByHash {
        hash: String,
    },
    TransactionByBlockHashAndIndex {
        block_hash: String,
        index: String,
    },
    TransactionByBlockNumberAndIndex {
        block_number: String,
        index: String,
    },
    BlockNumber,
    BlockByHash {
        block_hash: String,
        full_tx: bool,
    },
    BlockByNumber {
        block_number: String,
        full_tx: bool,
    },
    Balance {
        address: String,
        block: String,
    },
    Call {
        payload: Value,
        block: String,
    },
    GasPrice,
    /// Pass-through JSON-RPC call for a method owned by one chain family.
    Request {
        family: ChainFamily,
        method: String,
        params: Vec<Value>,
    },
}

impl Operation {
    pub fn name(&self) -> &str {
        match self {
            Operation::TransactionByHash { .. } => "get_transaction_by_hash",
            Operation::TransactionByBlockHashAndIndex { .. } => {
                "get_transaction_by_block_hash_and_index"
            }
            Operation::TransactionByBlockNumberAndIndex { .. } => {
                "get_transaction_by_block_number_and_index"
            }
            Operation::BlockNumber => "get_block_number",
            Operation::BlockByHash { .. } => "get_block_by_hash",
            Operation::BlockByNumber { .. } => "get_block_by_number",
            Operation::Balance { .. } => "get_balance",
            Operation::Call { .. } => "call",
            Operation::GasPrice => "gas_price",
            Operation::Request { method, .. } => method,
        }
    }
}
