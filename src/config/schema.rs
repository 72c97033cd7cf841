//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.
//! Secrets (signer key, storage token) are never part of the file schema;
//! they are read from environment variables at startup.

use serde::{Deserialize, Serialize};

/// Root configuration for the issuance service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// API listener configuration.
    pub listener: ListenerConfig,

    /// Chain RPC and contract settings.
    pub chain: ChainConfig,

    /// Content store (pinning service) settings.
    pub storage: StorageConfig,

    /// Event indexer settings.
    pub indexer: IndexerConfig,

    /// Local record persistence.
    pub persistence: PersistenceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// API listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request handler timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 120,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Chain RPC and credential contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Primary JSON-RPC endpoint.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoints, tried in order after the primary.
    pub failover_urls: Vec<String>,

    /// Expected chain ID (EIP-155).
    pub chain_id: u64,

    /// Deployed credential contract address.
    pub contract_address: String,

    /// Timeout for individual RPC calls in seconds.
    pub rpc_timeout_secs: u64,

    /// Block depth required before a mint counts as confirmed.
    pub confirmation_blocks: u32,

    /// Maximum time to wait for mint confirmation in seconds.
    pub confirmation_timeout_secs: u64,

    /// Refuse to mint above this gas price (gwei).
    pub max_gas_price_gwei: u64,

    /// Safety multiplier applied to the quoted gas price.
    pub gas_price_multiplier: f64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337,
            contract_address: String::new(),
            rpc_timeout_secs: 10,
            confirmation_blocks: 3,
            confirmation_timeout_secs: 180,
            max_gas_price_gwei: 500,
            gas_price_multiplier: 1.1,
        }
    }
}

/// Content store configuration.
///
/// The service talks to a Pinata-style pinning gateway: uploads go to
/// `upload_url`, reads go through `gateway_url/<cid>`. The bearer token is
/// read from the environment, not from this file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Upload endpoint of the pinning service.
    pub upload_url: String,

    /// Read gateway base URL; the cid is appended as a path segment.
    pub gateway_url: String,

    /// Timeout for upload/fetch requests in seconds.
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_url: "https://uploads.pinata.cloud/v3/files".to_string(),
            gateway_url: "https://gateway.pinata.cloud/ipfs".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Event indexer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Enable the polling indexer task.
    pub enabled: bool,

    /// Seconds between polling ticks. The next tick is scheduled only after
    /// the previous one completes, so ticks never overlap.
    pub poll_interval_secs: u64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: 10,
        }
    }
}

/// Local record persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Path of the JSON snapshot holding templates, issuance logs and the
    /// indexer cursor. Absent means in-memory only.
    pub path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Emit logs as JSON instead of human-readable lines.
    pub log_json: bool,

    /// Default log filter when RUST_LOG is unset.
    pub log_filter: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Bind address for the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_json: false,
            log_filter: "certmint=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ServiceConfig::default();
        assert_eq!(config.chain.confirmation_blocks, 3);
        assert_eq!(config.indexer.poll_interval_secs, 10);
        assert!(config.persistence.path.is_none());
    }

    #[test]
    fn parses_partial_toml() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [chain]
            rpc_url = "http://node:8545"
            chain_id = 80002
            contract_address = "0x0000000000000000000000000000000000000001"

            [indexer]
            poll_interval_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.chain.chain_id, 80002);
        assert_eq!(config.indexer.poll_interval_secs, 5);
        // Untouched sections fall back to defaults.
        assert_eq!(config.storage.timeout_secs, 30);
    }
}
