//! Content store client subsystem.
//!
//! The store is treated as an external collaborator: content-addressed,
//! immutable once uploaded. Everything the rest of the service needs is the
//! [`ContentStore`] trait; `HttpContentStore` is the production
//! implementation.

pub mod client;
pub mod types;

pub use client::{ContentStore, HttpContentStore, STORAGE_TOKEN_ENV_VAR};
pub use types::{StorageConfig, StorageError, StorageResult, UploadReceipt};
