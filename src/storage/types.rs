//! Content store types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export StorageConfig from the config module to avoid duplication.
pub use crate::config::schema::StorageConfig;

/// Result of pinning a buffer to the content store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Content identifier of the pinned bytes.
    pub cid: String,
    /// Size of the pinned content in bytes.
    pub size: u64,
}

/// Errors that can occur talking to the content store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store was unreachable or the request timed out.
    #[error("Content store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected an upload.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// A fetch by cid failed.
    #[error("Fetch of {cid} failed: {reason}")]
    Fetch { cid: String, reason: String },

    /// The store answered with something we could not parse.
    #[error("Malformed store response: {0}")]
    BadResponse(String),
}

/// Result type for content store operations.
pub type StorageResult<T> = Result<T, StorageError>;
