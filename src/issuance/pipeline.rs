//! The credential issuance pipeline.
//!
//! Orchestrates: load template → fetch background → render artifact → pin
//! artifact → build metadata → pin metadata → mint → confirm. Steps are
//! strictly sequential; the first failure aborts the rest. There is no
//! compensation of completed steps: if the mint fails after the uploads, the
//! pinned artifact and metadata stay orphaned in the content store. That is
//! an accepted cost of not having atomicity across the store and the chain;
//! orphaned cids are logged at `warn` for operational cleanup.
//!
//! The pipeline never writes issuance logs. Local rows are created by the
//! indexer once the mint event is observed on-chain, so the local mirror is
//! eventually consistent with the ledger.

use alloy::primitives::Address;

use crate::chain::CredentialMinter;
use crate::issuance::metadata::{build_metadata, CID_SCHEME};
use crate::issuance::types::{IssuanceRequest, IssueError};
use crate::observability::metrics;
use crate::renderer;
use crate::storage::{ContentStore, StorageError};
use crate::store::Registry;

/// Issues credentials against a content store and the credential contract.
#[derive(Debug, Clone)]
pub struct IssuancePipeline<S, M> {
    registry: Registry,
    content: S,
    minter: M,
}

impl<S: ContentStore, M: CredentialMinter> IssuancePipeline<S, M> {
    pub fn new(registry: Registry, content: S, minter: M) -> Self {
        Self {
            registry,
            content,
            minter,
        }
    }

    /// Run one issuance to completion, returning the mint transaction hash.
    pub async fn issue(&self, request: IssuanceRequest) -> Result<String, IssueError> {
        tracing::info!(
            template_id = request.template_id,
            recipient = %request.recipient_address,
            "Starting issuance"
        );

        let recipient: Address = request
            .recipient_address
            .parse()
            .map_err(|_| {
                IssueError::Validation(format!(
                    "recipient is not a chain address: {}",
                    request.recipient_address
                ))
            })?;

        // 1. Load the template.
        let template = self
            .registry
            .template(request.template_id)
            .ok_or(IssueError::TemplateNotFound(request.template_id))?;
        if template.background_cid.is_empty() {
            return Err(IssueError::IncompleteTemplate(template.id));
        }

        // 2. Fetch the background and render the artifact.
        let background = self
            .content
            .fetch(&template.background_cid)
            .await
            .map_err(IssueError::SourceFetch)?;
        let artifact =
            renderer::render(&background, &template.dynamic_fields, &request.dynamic_data)?;

        // 3. Pin the artifact.
        let artifact_receipt = self
            .content
            .upload(
                artifact,
                &format!("credential-{}.png", request.recipient_address),
                "image/png",
            )
            .await
            .map_err(IssueError::Storage)?;
        tracing::info!(cid = %artifact_receipt.cid, "Artifact pinned");

        // 4. Build and pin the metadata.
        let metadata = build_metadata(
            &template,
            &request.recipient_address,
            &request.dynamic_data,
            &artifact_receipt.cid,
        );
        let metadata_bytes = metadata
            .to_bytes()
            .map_err(|e| IssueError::Storage(StorageError::BadResponse(e.to_string())))?;
        let metadata_receipt = self
            .content
            .upload(metadata_bytes, "metadata.json", "application/json")
            .await
            .map_err(|e| {
                tracing::warn!(
                    orphaned_cid = %artifact_receipt.cid,
                    "Metadata upload failed after artifact was pinned"
                );
                IssueError::Storage(e)
            })?;
        tracing::info!(cid = %metadata_receipt.cid, "Metadata pinned");

        // 5. Mint and wait for confirmation.
        let token_uri = format!("{}{}", CID_SCHEME, metadata_receipt.cid);
        let tx_hash = self
            .minter
            .mint(recipient, &token_uri)
            .await
            .inspect_err(|_| {
                tracing::warn!(
                    orphaned_artifact = %artifact_receipt.cid,
                    orphaned_metadata = %metadata_receipt.cid,
                    "Mint failed after uploads; pinned content is orphaned"
                );
                metrics::record_issuance("failed");
            })?;

        metrics::record_issuance("confirmed");
        tracing::info!(tx_hash = %tx_hash, "Issuance complete");
        Ok(tx_hash)
    }
}
