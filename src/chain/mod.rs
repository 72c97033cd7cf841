//! Chain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key, RPC URL)
//!     → wallet.rs (key loading)
//!     → client.rs (RPC connection with timeouts, failover)
//!     → contract.rs (mint, confirm, reads, event decoding)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod contract;
pub mod types;
pub mod wallet;

pub use client::ChainClient;
pub use contract::{CredentialContract, CredentialMinter, EventSource};
pub use types::{ChainConfig, ChainError, ChainResult, ConfirmationStatus, IssuedEvent};
pub use wallet::Wallet;
