//! Solana JSON-RPC methods exposed as lower-case tools.
//!
//! Arguments are positional and 0-based: `param0` is the first JSON-RPC
//! param, and the trailing optional `paramN` is the method's config object.

use super::params::{ParamKind as K, ParamSpec as P, Shape};
use super::{Handler, ToolSpec};
use crate::blockchain::models::ChainFamily;

const ACCOUNT: P = P::req("param0", K::Pubkey, "Account public key (base58).");
const SLOT: P = P::req("param0", K::Integer, "Slot number.");
const SIGNATURE: P = P::req("param0", K::String, "Transaction signature (base58).");

const fn config(name: &'static str) -> P {
    P::opt(
        name,
        K::Object,
        "Config object, e.g. {\"commitment\": \"finalized\", \"encoding\": \"jsonParsed\"}.",
    )
}

fn rpc(
    tool: &'static str,
    method: &'static str,
    description: &'static str,
    params: Vec<P>,
) -> ToolSpec {
    ToolSpec::new(
        tool,
        method,
        description,
        params,
        Handler::Rpc {
            family: ChainFamily::Solana,
            method,
            shape: Shape::Positional,
        },
    )
}

pub fn tools() -> Vec<ToolSpec> {
    vec![
        rpc("getaccountinfo", "getAccountInfo", "Returns all information associated with an account.", vec![ACCOUNT, config("param1")]),
        rpc("getbalance", "getBalance", "Returns the lamport balance of an account.", vec![ACCOUNT, config("param1")]),
        rpc("getblock", "getBlock", "Returns identity and transaction information about a confirmed block.", vec![SLOT, config("param1")]),
        rpc("getblockcommitment", "getBlockCommitment", "Returns the commitment for a block.", vec![SLOT]),
        rpc("getblockheight", "getBlockHeight", "Returns the current block height of the node.", vec![config("param0")]),
        rpc("getblockproduction", "getBlockProduction", "Returns recent block production information for the current or previous epoch.", vec![config("param0")]),
        rpc(
            "getblocks",
            "getBlocks",
            "Returns the confirmed blocks between two slots.",
            vec![
                P::req("param0", K::Integer, "Start slot."),
                P::opt("param1", K::Integer, "End slot (inclusive); at most 500,000 slots after the start."),
                config("param2"),
            ],
        ),
        rpc(
            "getblockswithlimit",
            "getBlocksWithLimit",
            "Returns confirmed blocks starting at a slot.",
            vec![
                P::req("param0", K::Integer, "Start slot."),
                P::req("param1", K::Integer, "Maximum number of blocks to return."),
                config("param2"),
            ],
        ),
        rpc("getblocktime", "getBlockTime", "Returns the estimated production time of a block (Unix seconds).", vec![SLOT]),
        rpc("getclusternodes", "getClusterNodes", "Returns information about all nodes participating in the cluster.", vec![]),
        rpc("getepochinfo", "getEpochInfo", "Returns information about the current epoch.", vec![config("param0")]),
        rpc("getepochschedule", "getEpochSchedule", "Returns the epoch schedule from the genesis config.", vec![]),
        rpc(
            "getfeeformessage",
            "getFeeForMessage",
            "Returns the fee the network will charge for a message.",
            vec![P::req("param0", K::String, "Base64-encoded message."), config("param1")],
        ),
        rpc("getfirstavailableblock", "getFirstAvailableBlock", "Returns the slot of the lowest confirmed block still available.", vec![]),
        rpc("getgenesishash", "getGenesisHash", "Returns the genesis hash.", vec![]),
        rpc("gethealth", "getHealth", "Returns the current health of the node.", vec![]),
        rpc("gethighestsnapshotslot", "getHighestSnapshotSlot", "Returns the highest slot for which the node has snapshots.", vec![]),
        rpc("getidentity", "getIdentity", "Returns the identity public key of the node.", vec![]),
        rpc("getinflationgovernor", "getInflationGovernor", "Returns the current inflation governor.", vec![config("param0")]),
        rpc("getinflationrate", "getInflationRate", "Returns the specific inflation values for the current epoch.", vec![]),
        rpc(
            "getinflationreward",
            "getInflationReward",
            "Returns the inflation or staking reward for a list of addresses for an epoch.",
            vec![P::req("param0", K::Array, "Addresses to query (base58)."), config("param1")],
        ),
        rpc("getlargestaccounts", "getLargestAccounts", "Returns the 20 largest accounts by lamport balance.", vec![config("param0")]),
        rpc("getlatestblockhash", "getLatestBlockhash", "Returns the latest blockhash.", vec![config("param0")]),
        rpc(
            "getleaderschedule",
            "getLeaderSchedule",
            "Returns the leader schedule for an epoch.",
            vec![P::opt("param0", K::Integer, "Slot within the epoch; defaults to the current epoch."), config("param1")],
        ),
        rpc("getmaxretransmitslot", "getMaxRetransmitSlot", "Returns the max slot seen from the retransmit stage.", vec![]),
        rpc("getmaxshredinsertslot", "getMaxShredInsertSlot", "Returns the max slot seen from after shred insert.", vec![]),
        rpc(
            "getminimumbalanceforrentexemption",
            "getMinimumBalanceForRentExemption",
            "Returns the minimum balance required to make an account rent exempt.",
            vec![P::req("param0", K::Integer, "Account data length in bytes."), config("param1")],
        ),
        rpc(
            "getmultipleaccounts",
            "getMultipleAccounts",
            "Returns the account information for a list of public keys.",
            vec![P::req("param0", K::Array, "Public keys to query (base58)."), config("param1")],
        ),
        rpc(
            "getprogramaccounts",
            "getProgramAccounts",
            "Returns all accounts owned by a program; filters go in the config object.",
            vec![P::req("param0", K::Pubkey, "Program id (base58)."), config("param1")],
        ),
        rpc(
            "getrecentperformancesamples",
            "getRecentPerformanceSamples",
            "Returns recent performance samples in reverse slot order.",
            vec![P::opt("param0", K::Integer, "Number of samples to return (max 720).")],
        ),
        rpc(
            "getrecentprioritizationfees",
            "getRecentPrioritizationFees",
            "Returns prioritization fees from recent blocks.",
            vec![P::opt("param0", K::Array, "Account addresses whose writes should be considered.")],
        ),
        rpc(
            "getsignaturesforaddress",
            "getSignaturesForAddress",
            "Returns signatures for confirmed transactions that include the address.",
            vec![ACCOUNT, config("param1")],
        ),
        rpc(
            "getsignaturestatuses",
            "getSignatureStatuses",
            "Returns the statuses of a list of signatures.",
            vec![P::req("param0", K::Array, "Transaction signatures (base58)."), config("param1")],
        ),
        rpc("getslot", "getSlot", "Returns the slot that has reached the given or default commitment level.", vec![config("param0")]),
        rpc("getslotleader", "getSlotLeader", "Returns the current slot leader.", vec![config("param0")]),
        rpc(
            "getslotleaders",
            "getSlotLeaders",
            "Returns the slot leaders for a slot range.",
            vec![
                P::req("param0", K::Integer, "Start slot."),
                P::req("param1", K::Integer, "Number of leaders to return (1-5000)."),
            ],
        ),
        rpc("getstakeminimumdelegation", "getStakeMinimumDelegation", "Returns the stake minimum delegation in lamports.", vec![config("param0")]),
        rpc("getsupply", "getSupply", "Returns information about the current supply.", vec![config("param0")]),
        rpc(
            "gettokenaccountbalance",
            "getTokenAccountBalance",
            "Returns the token balance of an SPL token account.",
            vec![ACCOUNT, config("param1")],
        ),
        rpc(
            "gettokenaccountsbyowner",
            "getTokenAccountsByOwner",
            "Returns all SPL token accounts owned by an address.",
            vec![
                ACCOUNT,
                P::req("param1", K::Object, "Either {\"mint\": <pubkey>} or {\"programId\": <pubkey>}."),
                config("param2"),
            ],
        ),
        rpc(
            "gettokenaccountsbydelegate",
            "getTokenAccountsByDelegate",
            "Returns all SPL token accounts delegated to an address.",
            vec![
                ACCOUNT,
                P::req("param1", K::Object, "Either {\"mint\": <pubkey>} or {\"programId\": <pubkey>}."),
                config("param2"),
            ],
        ),
        rpc(
            "gettokenlargestaccounts",
            "getTokenLargestAccounts",
            "Returns the 20 largest accounts of an SPL token.",
            vec![P::req("param0", K::Pubkey, "Token mint (base58)."), config("param1")],
        ),
        rpc(
            "gettokensupply",
            "getTokenSupply",
            "Returns the total supply of an SPL token.",
            vec![P::req("param0", K::Pubkey, "Token mint (base58)."), config("param1")],
        ),
        rpc("gettransaction", "getTransaction", "Returns transaction details for a confirmed transaction.", vec![SIGNATURE, config("param1")]),
        rpc("gettransactioncount", "getTransactionCount", "Returns the current transaction count from the ledger.", vec![config("param0")]),
        rpc("getversion", "getVersion", "Returns the Solana version running on the node.", vec![]),
        rpc(
            "simulatetransaction",
            "simulateTransaction",
            "Simulates sending a transaction.",
            vec![P::req("param0", K::String, "Signed transaction, encoded (base64 recommended)."), config("param1")],
        ),
        rpc(
            "isblockhashvalid",
            "isBlockhashValid",
            "Returns whether a blockhash is still valid.",
            vec![P::req("param0", K::String, "Blockhash (base58)."), config("param1")],
        ),
    ]
}
