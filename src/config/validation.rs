//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, intervals > 0)
//! - Check addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use alloy::primitives::Address;

use crate::config::schema::ServiceConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `chain.rpc_url`.
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut push = |field: &str, message: String| {
        errors.push(ValidationError {
            field: field.to_string(),
            message,
        });
    };

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        push(
            "listener.bind_address",
            format!("not a socket address: {}", config.listener.bind_address),
        );
    }
    if config.listener.request_timeout_secs == 0 {
        push("listener.request_timeout_secs", "must be > 0".to_string());
    }

    if config.chain.rpc_url.parse::<url::Url>().is_err() {
        push("chain.rpc_url", format!("not a URL: {}", config.chain.rpc_url));
    }
    for (i, u) in config.chain.failover_urls.iter().enumerate() {
        if u.parse::<url::Url>().is_err() {
            push("chain.failover_urls", format!("entry {i} is not a URL: {u}"));
        }
    }
    if config.chain.contract_address.parse::<Address>().is_err() {
        push(
            "chain.contract_address",
            format!("not an address: {:?}", config.chain.contract_address),
        );
    }
    if config.chain.rpc_timeout_secs == 0 {
        push("chain.rpc_timeout_secs", "must be > 0".to_string());
    }
    if config.chain.gas_price_multiplier < 1.0 {
        push("chain.gas_price_multiplier", "must be >= 1.0".to_string());
    }

    if config.storage.upload_url.parse::<url::Url>().is_err() {
        push(
            "storage.upload_url",
            format!("not a URL: {}", config.storage.upload_url),
        );
    }
    if config.storage.gateway_url.parse::<url::Url>().is_err() {
        push(
            "storage.gateway_url",
            format!("not a URL: {}", config.storage.gateway_url),
        );
    }
    if config.storage.timeout_secs == 0 {
        push("storage.timeout_secs", "must be > 0".to_string());
    }

    if config.indexer.enabled && config.indexer.poll_interval_secs == 0 {
        push("indexer.poll_interval_secs", "must be > 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
