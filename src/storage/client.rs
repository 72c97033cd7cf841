//! HTTP client for a Pinata-style pinning service.
//!
//! # Responsibilities
//! - Pin opaque byte buffers, returning `{cid, size}`
//! - Fetch pinned content back through the read gateway
//! - Enforce request timeouts; bearer token only from the environment
//!
//! The wire contract is deliberately small: uploads are a multipart POST
//! answered with a JSON body carrying `cid` and `size` (nested under `data`
//! for the v3 API), fetches are a GET of `<gateway>/<cid>`.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use crate::observability::metrics;
use crate::storage::types::{StorageConfig, StorageError, StorageResult, UploadReceipt};

/// Environment variable name for the pinning service bearer token.
pub const STORAGE_TOKEN_ENV_VAR: &str = "CERTMINT_STORAGE_TOKEN";

/// Interface to a content-addressed, immutable blob store.
pub trait ContentStore: Send + Sync {
    /// Pin `bytes`, returning the content identifier and stored size.
    fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> impl Future<Output = StorageResult<UploadReceipt>> + Send;

    /// Retrieve previously pinned bytes by content identifier.
    fn fetch(&self, cid: &str) -> impl Future<Output = StorageResult<Vec<u8>>> + Send;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    cid: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct WrappedUploadResponse {
    data: UploadResponse,
}

/// `reqwest`-backed [`ContentStore`] implementation.
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    http: reqwest::Client,
    config: StorageConfig,
    token: Option<String>,
}

impl HttpContentStore {
    /// Build a client from config; the bearer token, if any, comes from
    /// `CERTMINT_STORAGE_TOKEN`.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StorageError::Unavailable(format!("client build failed: {}", e)))?;

        let token = std::env::var(STORAGE_TOKEN_ENV_VAR).ok();
        if token.is_none() {
            tracing::warn!(
                env_var = STORAGE_TOKEN_ENV_VAR,
                "No pinning token set; uploads will be unauthenticated"
            );
        }

        Ok(Self {
            http,
            config,
            token,
        })
    }
}

impl ContentStore for HttpContentStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> StorageResult<UploadReceipt> {
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime_type)
            .map_err(|e| StorageError::Upload(format!("invalid mime type: {}", e)))?;
        let form = Form::new().part("file", part);

        let mut request = self.http.post(&self.config.upload_url).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Upload(format!("{}: {}", status, body)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StorageError::BadResponse(e.to_string()))?;

        // v3 nests the payload under `data`; older endpoints answer flat.
        let receipt = match serde_json::from_str::<WrappedUploadResponse>(&body) {
            Ok(wrapped) => wrapped.data,
            Err(_) => serde_json::from_str::<UploadResponse>(&body)
                .map_err(|e| StorageError::BadResponse(format!("{}: {}", e, body)))?,
        };

        tracing::info!(cid = %receipt.cid, size = receipt.size, filename, "Pinned content");
        metrics::record_upload(size as u64);

        Ok(UploadReceipt {
            cid: receipt.cid,
            size: receipt.size,
        })
    }

    async fn fetch(&self, cid: &str) -> StorageResult<Vec<u8>> {
        let url = format!("{}/{}", self.config.gateway_url.trim_end_matches('/'), cid);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Fetch {
                cid: cid.to_string(),
                reason: status.to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| StorageError::Fetch {
            cid: cid.to_string(),
            reason: e.to_string(),
        })?;

        Ok(bytes.to_vec())
    }
}
