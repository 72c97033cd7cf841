//! Credential contract bindings: mint, reads, event decoding.
//!
//! # Responsibilities
//! - Encode and submit `issueCredential` transactions through a signing provider
//! - Monitor confirmations with a receipt polling loop
//! - Read `tokenURI` / `isRevoked` via eth_call
//! - Decode `CredentialIssued` logs for the indexer
//!
//! The [`CredentialMinter`] and [`EventSource`] traits are the seams the
//! issuance pipeline and the indexer depend on, so both can be driven by
//! in-memory fakes in tests.

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::eth::Filter;
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::chain::client::ChainClient;
use crate::chain::types::{ChainError, ChainResult, ConfirmationStatus, IssuedEvent};
use crate::chain::wallet::Wallet;

sol! {
    /// Emitted by the contract on every successful mint.
    #[derive(Debug)]
    event CredentialIssued(uint256 indexed tokenId, address indexed recipient, string tokenURI);

    function issueCredential(address to, string tokenURI) external returns (uint256);
    function tokenURI(uint256 tokenId) external view returns (string);
    function isRevoked(uint256 tokenId) external view returns (bool);
}

/// Submits mint transactions and waits for their confirmation.
pub trait CredentialMinter: Send + Sync {
    /// Mint a credential to `recipient` with the given token URI.
    ///
    /// Resolves once the transaction has reached the configured confirmation
    /// depth, returning the 0x-prefixed transaction hash.
    fn mint(
        &self,
        recipient: Address,
        token_uri: &str,
    ) -> impl Future<Output = ChainResult<String>> + Send;
}

/// Read access to the chain's issuance event log.
pub trait EventSource: Send + Sync {
    /// Current chain height.
    fn latest_block(&self) -> impl Future<Output = ChainResult<u64>> + Send;

    /// `CredentialIssued` events in the inclusive block range, in chain order.
    fn issuance_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> impl Future<Output = ChainResult<Vec<IssuedEvent>>> + Send;
}

/// Handle to the deployed credential contract.
#[derive(Clone)]
pub struct CredentialContract {
    /// Read path with timeout + failover.
    client: ChainClient,
    /// Write path: provider with the minting wallet attached.
    signer: Arc<dyn Provider + Send + Sync>,
    /// Contract address.
    address: Address,
    /// Signer address, kept for logging.
    minter: Address,
}

impl CredentialContract {
    /// Bind to the contract at `address`, minting with `wallet`.
    pub fn new(client: ChainClient, wallet: Wallet, address: Address) -> ChainResult<Self> {
        let rpc_url: url::Url = client.config().rpc_url.parse().map_err(|e| {
            ChainError::Rpc(format!("Invalid RPC URL '{}': {}", client.config().rpc_url, e))
        })?;

        let minter = wallet.address();
        let eth_wallet = EthereumWallet::from(wallet.signer());
        let signer = Arc::new(
            ProviderBuilder::new()
                .wallet(eth_wallet)
                .connect_http(rpc_url),
        ) as Arc<dyn Provider + Send + Sync>;

        tracing::info!(
            contract = %address,
            minter = %minter,
            "Credential contract bound"
        );

        Ok(Self {
            client,
            signer,
            address,
            minter,
        })
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Read the token URI recorded at mint time.
    pub async fn token_uri(&self, token_id: U256) -> ChainResult<String> {
        let data = tokenURICall { tokenId: token_id }.abi_encode();
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(Bytes::from(data));
        let out = self.client.call(tx).await?;
        tokenURICall::abi_decode_returns(&out)
            .map_err(|e| ChainError::Rpc(format!("tokenURI decode failed: {}", e)))
    }

    /// Check whether a credential has been revoked.
    pub async fn is_revoked(&self, token_id: U256) -> ChainResult<bool> {
        let data = isRevokedCall { tokenId: token_id }.abi_encode();
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(Bytes::from(data));
        let out = self.client.call(tx).await?;
        isRevokedCall::abi_decode_returns(&out)
            .map_err(|e| ChainError::Rpc(format!("isRevoked decode failed: {}", e)))
    }

    /// Wait for a transaction to reach the configured confirmation depth.
    pub async fn wait_for_confirmation(&self, tx_hash: TxHash) -> ChainResult<ConfirmationStatus> {
        let required_confirmations = self.client.confirmation_blocks();
        let timeout_duration =
            Duration::from_secs(self.client.config().confirmation_timeout_secs);
        let poll_interval = Duration::from_secs(2);

        let result = timeout(timeout_duration, async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                let receipt = match self.client.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Ok(ConfirmationStatus::Failed(
                        "Transaction reverted".to_string(),
                    ));
                }

                let current_block = self.client.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);
                let confirmations = current_block.saturating_sub(tx_block) as u32;

                if confirmations >= required_confirmations {
                    return Ok(ConfirmationStatus::Confirmed {
                        block_number: tx_block,
                    });
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = confirmations,
                    required = required_confirmations,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(_) => Err(ChainError::ConfirmationTimeout(required_confirmations)),
        }
    }

    /// Check the quoted gas price against the configured ceiling and return
    /// the adjusted price to bid.
    async fn checked_gas_price(&self) -> ChainResult<u128> {
        let config = self.client.config();
        let gas_price = self.client.get_gas_price().await?;
        let gas_price_gwei = gas_price / 1_000_000_000;

        if gas_price_gwei > config.max_gas_price_gwei as u128 {
            return Err(ChainError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei: config.max_gas_price_gwei,
            });
        }

        Ok((gas_price as f64 * config.gas_price_multiplier) as u128)
    }
}

impl CredentialMinter for CredentialContract {
    async fn mint(&self, recipient: Address, token_uri: &str) -> ChainResult<String> {
        let gas_price = self.checked_gas_price().await?;

        let data = issueCredentialCall {
            to: recipient,
            tokenURI: token_uri.to_string(),
        }
        .abi_encode();

        // Nonce and gas limit are supplied by the provider's fillers.
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(Bytes::from(data))
            .with_gas_price(gas_price);

        tracing::info!(
            recipient = %recipient,
            token_uri = %token_uri,
            minter = %self.minter,
            "Submitting mint transaction"
        );

        let pending = self
            .signer
            .send_transaction(tx)
            .await
            .map_err(|e| ChainError::Rpc(format!("mint broadcast failed: {}", e)))?;
        let tx_hash = *pending.tx_hash();

        tracing::info!(tx_hash = %tx_hash, "Mint transaction sent");

        match self.wait_for_confirmation(tx_hash).await? {
            ConfirmationStatus::Confirmed { block_number } => {
                tracing::info!(tx_hash = %tx_hash, block = block_number, "Mint confirmed");
                Ok(tx_hash.to_string())
            }
            ConfirmationStatus::Failed(reason) => Err(ChainError::Reverted(reason)),
            other => Err(ChainError::Rpc(format!(
                "unexpected confirmation state: {:?}",
                other
            ))),
        }
    }
}

impl EventSource for CredentialContract {
    async fn latest_block(&self) -> ChainResult<u64> {
        self.client.get_block_number().await
    }

    async fn issuance_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> ChainResult<Vec<IssuedEvent>> {
        let filter = Filter::new()
            .address(self.address)
            .from_block(from_block)
            .to_block(to_block)
            .event(CredentialIssued::SIGNATURE);

        let logs = self.client.get_logs(&filter).await?;

        let mut events = Vec::with_capacity(logs.len());
        for log in logs {
            match log.log_decode::<CredentialIssued>() {
                Ok(decoded) => {
                    let tx_hash = log
                        .transaction_hash
                        .map(|h| h.to_string())
                        .unwrap_or_default();
                    let block_number = log.block_number.unwrap_or_default();
                    let event = decoded.inner.data;
                    events.push(IssuedEvent {
                        token_id: event.tokenId,
                        recipient: event.recipient,
                        token_uri: event.tokenURI,
                        tx_hash,
                        block_number,
                    });
                }
                Err(e) => {
                    // Signature matched but the body didn't decode; skip
                    // rather than poison the whole range.
                    tracing::warn!(error = %e, "Undecodable CredentialIssued log");
                }
            }
        }
        Ok(events)
    }
}

impl std::fmt::Debug for CredentialContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialContract")
            .field("address", &self.address)
            .field("minter", &self.minter)
            .finish()
    }
}
