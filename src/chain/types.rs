//! Chain-specific types and error definitions.

use alloy::primitives::{Address, U256};
use thiserror::Error;

// Re-export ChainConfig from the config module to avoid duplication.
pub use crate::config::schema::ChainConfig;

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was not confirmed within the configured window.
    #[error("Transaction not confirmed after {0} blocks")]
    ConfirmationTimeout(u32),

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Gas price exceeded the configured ceiling.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Chain client not initialized or misconfigured.
    #[error("Chain not available: {0}")]
    NotAvailable(String),
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Transaction confirmation status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Transaction is pending in the mempool.
    Pending,
    /// Transaction has been mined but lacks the required depth.
    Confirming { current: u32, required: u32 },
    /// Transaction is confirmed with the required block depth.
    Confirmed { block_number: u64 },
    /// Transaction failed or was dropped.
    Failed(String),
}

/// A decoded `CredentialIssued` event, as observed by the indexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedEvent {
    /// Chain-assigned token identifier.
    pub token_id: U256,
    /// Credential holder.
    pub recipient: Address,
    /// Metadata URI recorded at mint time.
    pub token_uri: String,
    /// Hash of the mint transaction, 0x-prefixed hex.
    pub tx_hash: String,
    /// Block the event was emitted in.
    pub block_number: u64,
}
