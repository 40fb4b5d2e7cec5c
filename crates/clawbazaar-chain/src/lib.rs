//! ClawBazaar chain client.
//!
//! Thin typed functions over Base JSON-RPC: calldata builders for the
//! marketplace, editions, and BZAAR token contracts, EIP-155 legacy
//! transaction signing, and receipt polling. The contracts themselves are
//! external collaborators; nothing here reimplements their logic.

pub mod abi;
pub mod rlp;
pub mod rpc;
pub mod tx;

pub use alloy_primitives::{Address, B256, U256};
pub use rpc::{RpcClient, TransactionReceipt};
pub use tx::{parse_private_key, private_key_to_address, LegacyTransaction, SignedTransaction};

/// Errors produced by the chain client.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected RPC response: {0}")]
    BadResponse(String),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Transaction {0} reverted")]
    Reverted(String),

    #[error("Timed out waiting for transaction {0}")]
    ConfirmationTimeout(String),
}
