// src/blockchain/mod.rs

pub mod adapter;
pub mod chains;
pub mod client;
pub mod evm;
pub mod models;
pub mod registry;
pub mod rpc;
pub mod solana;

// Re-export commonly used types
pub use adapter::ChainAdapter;
pub use client::BlockchainClient;
pub use models::{ChainError, ChainFamily, Operation};
pub use registry::AdapterRegistry;
pub use rpc::{HttpRpcClient, RpcClient};
