//! EVM JSON-RPC methods exposed one-to-one as tools.

use super::params::{
    call_object_params, state_override_params, tracer_params, DefaultArg, ParamKind as K,
    ParamSpec as P, Shape, BLOCK, TRACE_TYPES,
};
use super::{Handler, ToolSpec};
use crate::blockchain::models::ChainFamily;

fn rpc(method: &'static str, description: &'static str, params: Vec<P>, shape: Shape) -> ToolSpec {
    ToolSpec::new(
        method,
        method,
        description,
        params,
        Handler::Rpc {
            family: ChainFamily::Evm,
            method,
            shape,
        },
    )
}

fn plain(method: &'static str, description: &'static str, params: Vec<P>) -> ToolSpec {
    rpc(method, description, params, Shape::Positional)
}

const ADDRESS: P = P::req("address", K::String, "Account or contract address (0x-prefixed).");
const TX_HASH: P = P::req("tx_hash", K::String, "Transaction hash (0x-prefixed).");
const BLOCK_HASH: P = P::req("block_hash", K::String, "Block hash (0x-prefixed).");
const BLOCK_NUMBER: P = P::req(
    "block_number",
    K::Quantity,
    "Block number (decimal or hex) or tag such as latest.",
);
const FULL_TX: P = P::opt(
    "full_tx",
    K::Boolean,
    "Return full transaction objects instead of hashes.",
)
.or(DefaultArg::Bool(false));

fn with(mut base: Vec<P>, extra: Vec<P>) -> Vec<P> {
    base.extend(extra);
    base
}

pub fn tools() -> Vec<ToolSpec> {
    vec![
        plain("web3_clientVersion", "Returns the current client version of the node.", vec![]),
        plain(
            "web3_sha3",
            "Returns Keccak-256 (not the standardized SHA3-256) of the given data.",
            vec![P::req("data", K::String, "Data to hash, as a 0x-prefixed hex string.")],
        ),
        plain("net_version", "Returns the current network ID.", vec![]),
        plain(
            "net_listening",
            "Returns true if the client is actively listening for network connections.",
            vec![],
        ),
        plain("net_peerCount", "Returns the number of peers connected to the client (hex).", vec![]),
        plain(
            "eth_syncing",
            "Returns an object describing the sync status, or false when the node is not syncing.",
            vec![],
        ),
        plain("eth_chainId", "Returns the chain ID of the current network (hex).", vec![]),
        plain("eth_blockNumber", "Returns the number of the most recent block (hex).", vec![]),
        plain("eth_gasPrice", "Returns the current price per gas in wei (hex).", vec![]),
        plain(
            "eth_feeHistory",
            "Returns base fee, gas used ratio and optional priority fee rewards for a range of blocks.",
            vec![
                P::req("block_count", K::Quantity, "Number of blocks in the requested range."),
                P::req("newest_block", K::Quantity, "Highest block of the range (number or tag)."),
                P::opt(
                    "reward_percentiles",
                    K::Array,
                    "Percentiles of priority fees to sample, e.g. [25, 50, 75].",
                )
                .or(DefaultArg::Strs(&[])),
            ],
        ),
        plain(
            "eth_maxPriorityFeePerGas",
            "Returns a suggested max priority fee per gas in wei (hex).",
            vec![],
        ),
        plain(
            "eth_getBalance",
            "Returns the balance of an address in wei (hex).",
            vec![ADDRESS, BLOCK],
        ),
        plain(
            "eth_getStorageAt",
            "Returns the value from a storage position at a given address.",
            vec![
                ADDRESS,
                P::req("position", K::Quantity, "Storage slot index."),
                BLOCK,
            ],
        ),
        plain(
            "eth_getTransactionCount",
            "Returns the number of transactions sent from an address (nonce).",
            vec![ADDRESS, BLOCK],
        ),
        plain("eth_getCode", "Returns the code stored at an address.", vec![ADDRESS, BLOCK]),
        rpc(
            "eth_call",
            "Executes a message call immediately without creating a transaction. \
             Optional state overrides apply to override_address.",
            with(with(call_object_params(true), vec![BLOCK]), state_override_params()),
            Shape::Call,
        ),
        rpc(
            "eth_estimateGas",
            "Estimates the gas a transaction would use without broadcasting it. \
             Optional state overrides apply to override_address.",
            with(with(call_object_params(false), vec![BLOCK]), state_override_params()),
            Shape::Call,
        ),
        plain(
            "eth_getBlockByHash",
            "Returns information about a block by hash.",
            vec![BLOCK_HASH, FULL_TX],
        ),
        plain(
            "eth_getBlockByNumber",
            "Returns information about a block by number or tag.",
            vec![BLOCK_NUMBER, FULL_TX],
        ),
        plain(
            "eth_getBlockTransactionCountByHash",
            "Returns the number of transactions in the block with the given hash.",
            vec![BLOCK_HASH],
        ),
        plain(
            "eth_getBlockTransactionCountByNumber",
            "Returns the number of transactions in the block with the given number.",
            vec![BLOCK_NUMBER],
        ),
        plain(
            "eth_getTransactionByHash",
            "Returns the transaction with the given hash.",
            vec![TX_HASH],
        ),
        plain(
            "eth_getTransactionReceipt",
            "Returns the receipt of a transaction (null when not mined or not found).",
            vec![TX_HASH],
        ),
        rpc(
            "eth_getLogs",
            "Returns logs matching a filter by block range or block hash, address and topics.",
            vec![
                P::opt("from_block", K::Quantity, "First block of the range."),
                P::opt("to_block", K::Quantity, "Last block of the range."),
                P::opt("address", K::String, "Contract address emitting the logs."),
                P::opt("topics", K::Array, "Topic filters, position-dependent."),
                P::opt("block_hash", K::String, "Restrict to a single block; excludes from/to."),
            ],
            Shape::LogFilter,
        ),
        rpc(
            "debug_traceTransaction",
            "Replays a transaction and returns its execution trace.",
            with(vec![TX_HASH], tracer_params()),
            Shape::Traced,
        ),
        rpc(
            "debug_traceCall",
            "Executes a call on top of a block and returns its execution trace.",
            with(with(call_object_params(true), vec![BLOCK]), tracer_params()),
            Shape::DebugTraceCall,
        ),
        rpc(
            "debug_traceBlock",
            "Traces every transaction of an RLP-encoded block.",
            with(
                vec![P::req("rlp_encoded_block", K::String, "The RLP-encoded block.")],
                tracer_params(),
            ),
            Shape::Traced,
        ),
        rpc(
            "debug_traceBlockByHash",
            "Re-executes and traces every transaction in the block with the given hash.",
            with(vec![BLOCK_HASH], tracer_params()),
            Shape::Traced,
        ),
        rpc(
            "debug_traceBlockByNumber",
            "Re-executes and traces every transaction in the block with the given number.",
            with(vec![BLOCK_NUMBER], tracer_params()),
            Shape::Traced,
        ),
        rpc(
            "trace_call",
            "Executes a call as if mined in the given block and returns the requested traces.",
            with(call_object_params(true), vec![TRACE_TYPES, BLOCK]),
            Shape::TraceCall,
        ),
        rpc(
            "trace_callMany",
            "Executes several calls in sequence on the same block and returns traces for each.",
            vec![
                P::req(
                    "calls",
                    K::Array,
                    "List of {\"call\": {...}, \"trace_types\": [...]} objects.",
                ),
                BLOCK,
            ],
            Shape::TraceCallMany,
        ),
        plain(
            "trace_rawTransaction",
            "Traces a raw signed transaction without broadcasting it.",
            vec![
                P::req("raw_tx", K::String, "Signed transaction as 0x-prefixed hex."),
                TRACE_TYPES,
            ],
        ),
        plain(
            "trace_replayTransaction",
            "Replays a mined transaction and returns the requested traces.",
            vec![TX_HASH, TRACE_TYPES],
        ),
        plain(
            "trace_replayBlockTransactions",
            "Replays every transaction of a block and returns the requested traces.",
            vec![BLOCK_NUMBER, TRACE_TYPES],
        ),
        plain("trace_block", "Returns the traces of all transactions in a block.", vec![BLOCK_NUMBER]),
        plain(
            "eth_getProof",
            "Returns the account and storage values of an address with Merkle proofs.",
            vec![
                ADDRESS,
                P::req("storage_keys", K::Array, "Storage keys to prove."),
                BLOCK,
            ],
        ),
        rpc(
            "eth_simulateV1",
            "Simulates a list of calls on top of a block, optionally with state and block overrides.",
            vec![
                P::req(
                    "block_state_calls",
                    K::Object,
                    "Object with blockStateCalls and optional stateOverrides/blockOverrides.",
                ),
                BLOCK,
                P::opt("validation", K::Boolean, "Enforce transaction validity checks.")
                    .or(DefaultArg::Bool(true)),
                P::opt("trace_transfers", K::Boolean, "Report ETH transfers as logs.")
                    .or(DefaultArg::Bool(false)),
            ],
            Shape::Simulate,
        ),
        plain(
            "eth_getBlockReceipts",
            "Returns all transaction receipts for a block.",
            vec![P::req("block", K::Quantity, "Block number or tag such as latest.")],
        ),
    ]
}
