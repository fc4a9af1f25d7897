//! Chain-agnostic tools. Each one maps onto an adapter [`Operation`]; chains
//! that have no equivalent answer with `not_supported`.

use serde_json::Value;

use super::params::{read, DefaultArg, ParamKind as K, ParamSpec as P};
use super::{Handler, ToolSpec};
use crate::blockchain::models::{ChainError, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semantic {
    TransactionById,
    TransactionByBlockHashIndex,
    TransactionByBlockNumberIndex,
    LatestBlockNumber,
    BlockByHash,
    BlockByNumber,
    Balance,
    CallContract,
    GasFees,
}

const BLOCK_HASH: P = P::req("block_hash", K::String, "Block hash.");
const BLOCK_NUMBER: P = P::req(
    "block_number",
    K::String,
    "Block number or slot (decimal or hex); EVM chains also accept tags such as latest.",
);
const INDEX: P = P::req("index", K::String, "Transaction position within the block (decimal or hex).");
const FULL_TX: P = P::opt("full_tx", K::Boolean, "Include full transaction objects.")
    .or(DefaultArg::Bool(false));
const BLOCK: P = P::opt(
    "block",
    K::String,
    "Block number or tag; on Solana a commitment level (processed, confirmed, finalized).",
)
.or(DefaultArg::Str("latest"));

fn tool(
    name: &'static str,
    title: &'static str,
    description: &'static str,
    params: Vec<P>,
    semantic: Semantic,
) -> ToolSpec {
    ToolSpec::new(name, title, description, params, Handler::Semantic(semantic))
}

pub fn tools() -> Vec<ToolSpec> {
    vec![
        tool(
            "get_transaction_by_id",
            "Get transaction details",
            "Returns a transaction by its hash (EVM) or signature (Solana).",
            vec![P::req("tx_hash", K::String, "Transaction hash or signature.")],
            Semantic::TransactionById,
        ),
        tool(
            "get_transaction_by_block_hash_index",
            "Get transaction details",
            "Returns the transaction at a position within the block with the given hash.",
            vec![BLOCK_HASH, INDEX],
            Semantic::TransactionByBlockHashIndex,
        ),
        tool(
            "get_transaction_by_block_number_index",
            "Get transaction details",
            "Returns the transaction at a position within the block with the given number.",
            vec![BLOCK_NUMBER, INDEX],
            Semantic::TransactionByBlockNumberIndex,
        ),
        tool(
            "get_latest_block_number",
            "Get block number",
            "Returns the most recent block number (EVM, hex) or slot (Solana).",
            vec![],
            Semantic::LatestBlockNumber,
        ),
        tool(
            "get_block_by_hash",
            "Get block by hash",
            "Returns a block by its hash.",
            vec![BLOCK_HASH, FULL_TX],
            Semantic::BlockByHash,
        ),
        tool(
            "get_block_by_number",
            "Get block by number",
            "Returns a block by its number (EVM) or slot (Solana).",
            vec![BLOCK_NUMBER, FULL_TX],
            Semantic::BlockByNumber,
        ),
        tool(
            "get_balance",
            "Get balance",
            "Returns the native balance of an address: decimal wei on EVM chains, lamports on Solana.",
            vec![P::req("address", K::String, "Account address."), BLOCK],
            Semantic::Balance,
        ),
        tool(
            "call_contract",
            "Call contract (eth_call, simulateTransaction)",
            "Executes a read-only call. EVM takes an eth_call object ({to, data, ...}); \
             Solana takes {\"transaction\": <encoded tx>, \"encoding\": \"base64\"}.",
            vec![P::req("payload", K::Object, "Call payload."), BLOCK],
            Semantic::CallContract,
        ),
        tool(
            "get_gas_fees",
            "Get gas price",
            "Returns the current gas price in wei (hex).",
            vec![],
            Semantic::GasFees,
        ),
    ]
}

fn string(specs: &[P], args: &Value, name: &str) -> Result<String, ChainError> {
    match arg(specs, args, name)? {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Ok(other.to_string()),
        None => Err(ChainError::invalid(format!("Missing required argument: '{}'", name))),
    }
}

fn flag(specs: &[P], args: &Value, name: &str) -> Result<bool, ChainError> {
    Ok(arg(specs, args, name)?
        .and_then(|v| v.as_bool())
        .unwrap_or(false))
}

fn arg(specs: &[P], args: &Value, name: &str) -> Result<Option<Value>, ChainError> {
    let spec = specs
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| ChainError::invalid(format!("Unknown argument: '{}'", name)))?;
    read(args, spec)
}

impl Semantic {
    /// Validates the declared arguments and builds the adapter operation.
    pub fn operation(&self, specs: &[P], args: &Value) -> Result<Operation, ChainError> {
        let op = match self {
            Semantic::TransactionById => Operation::TransactionByHash {
                hash: string(specs, args, "tx_hash")?,
            },
            Semantic::TransactionByBlockHashIndex => Operation::TransactionByBlockHashAndIndex {
                block_hash: string(specs, args, "block_hash")?,
                index: string(specs, args, "index")?,
            },
            Semantic::TransactionByBlockNumberIndex => {
                Operation::TransactionByBlockNumberAndIndex {
                    block_number: string(specs, args, "block_number")?,
                    index: string(specs, args, "index")?,
                }
            }
            Semantic::LatestBlockNumber => Operation::BlockNumber,
            Semantic::BlockByHash => Operation::BlockByHash {
                block_hash: string(specs, args, "block_hash")?,
                full_tx: flag(specs, args, "full_tx")?,
            },
            Semantic::BlockByNumber => Operation::BlockByNumber {
                block_number: string(specs, args, "block_number")?,
                full_tx: flag(specs, args, "full_tx")?,
            },
            Semantic::Balance => Operation::Balance {
                address: string(specs, args, "address")?,
                block: string(specs, args, "block")?,
            },
            Semantic::CallContract => Operation::Call {
                payload: arg(specs, args, "payload")?.unwrap_or(Value::Null),
                block: string(specs, args, "block")?,
            },
            Semantic::GasFees => Operation::GasPrice,
        };
        Ok(op)
    }
}
