//! Credential issuance service library.

pub mod chain;
pub mod config;
pub mod http;
pub mod indexer;
pub mod issuance;
pub mod lifecycle;
pub mod observability;
pub mod renderer;
pub mod storage;
pub mod store;

pub use config::ServiceConfig;
pub use indexer::EventIndexer;
pub use issuance::IssuancePipeline;
pub use lifecycle::Shutdown;
pub use store::Registry;
