//! Issuance request and error definitions.

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::chain::ChainError;
use crate::renderer::RenderError;
use crate::storage::StorageError;

/// A request to issue one credential. Transient; never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuanceRequest {
    /// Template to issue from.
    pub template_id: u64,
    /// Chain account of the credential holder.
    pub recipient_address: String,
    /// Field name → value. Fields without a value render as empty string.
    #[serde(default)]
    pub dynamic_data: BTreeMap<String, String>,
}

/// Errors from the issuance pipeline. The first failure aborts the run;
/// completed uploads are never rolled back.
#[derive(Debug, Error)]
pub enum IssueError {
    /// Referenced template does not exist.
    #[error("Template {0} not found")]
    TemplateNotFound(u64),

    /// Template exists but is missing its background reference.
    #[error("Template {0} is incomplete")]
    IncompleteTemplate(u64),

    /// Malformed caller input.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Background image could not be retrieved from the content store.
    #[error("Failed to fetch template background: {0}")]
    SourceFetch(StorageError),

    /// Compositing or encoding failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Artifact or metadata upload failed.
    #[error("Content store upload failed: {0}")]
    Storage(StorageError),

    /// Mint submission or confirmation failed.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_deserializes_without_dynamic_data() {
        let request: IssuanceRequest = serde_json::from_str(
            r#"{"template_id": 3, "recipient_address": "0xABC"}"#,
        )
        .unwrap();
        assert_eq!(request.template_id, 3);
        assert!(request.dynamic_data.is_empty());
    }
}
