//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read, parse)
//!     → validation.rs (semantic checks, all errors collected)
//!     → schema.rs types consumed by the rest of the service
//! ```

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ChainConfig, IndexerConfig, ListenerConfig, ObservabilityConfig, PersistenceConfig,
    ServiceConfig, StorageConfig,
};
pub use validation::{validate_config, ValidationError};
