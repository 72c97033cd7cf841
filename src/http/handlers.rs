//! Request handlers for the service API.

use alloy::primitives::U256;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::server::AppState;
use crate::issuance::{IssuanceRequest, IssueError};
use crate::store::records::{CredentialTemplate, DynamicField};
use crate::store::StoreError;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// An error with an HTTP status mapping.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<IssueError> for ApiError {
    fn from(err: IssueError) -> Self {
        let status = match &err {
            IssueError::TemplateNotFound(_) | IssueError::IncompleteTemplate(_) => {
                StatusCode::NOT_FOUND
            }
            IssueError::Validation(_) => StatusCode::BAD_REQUEST,
            IssueError::SourceFetch(_) | IssueError::Storage(_) | IssueError::Chain(_) => {
                StatusCode::BAD_GATEWAY
            }
            IssueError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub transaction_hash: String,
}

/// POST /api/credentials/issue
pub async fn issue_credential(
    State(state): State<AppState>,
    Json(request): Json<IssuanceRequest>,
) -> Result<Json<IssueResponse>, ApiError> {
    let issuance_id = Uuid::new_v4();
    tracing::info!(
        %issuance_id,
        template_id = request.template_id,
        "Issuance requested"
    );

    let transaction_hash = state.pipeline.issue(request).await.map_err(|e| {
        tracing::warn!(%issuance_id, error = %e, "Issuance failed");
        ApiError::from(e)
    })?;

    Ok(Json(IssueResponse { transaction_hash }))
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub token_id: u64,
    pub token_uri: String,
    pub revoked: bool,
}

/// GET /api/credentials/{token_id}/verify
pub async fn verify_credential(
    State(state): State<AppState>,
    Path(token_id): Path<u64>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let id = U256::from(token_id);
    let token_uri = state
        .contract
        .token_uri(id)
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_GATEWAY, e.to_string()))?;
    let revoked = state
        .contract
        .is_revoked(id)
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_GATEWAY, e.to_string()))?;

    Ok(Json(VerifyResponse {
        token_id,
        token_uri,
        revoked,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub institution_id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub background_cid: String,
    #[serde(default)]
    pub dynamic_fields: Vec<DynamicField>,
}

/// POST /api/templates
pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<CredentialTemplate>), ApiError> {
    let template = state
        .registry
        .create_template(
            request.institution_id,
            request.name,
            request.description,
            request.background_cid,
            request.dynamic_fields,
        )
        .map_err(|e: StoreError| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /api/templates
pub async fn list_templates(
    State(state): State<AppState>,
) -> Json<Vec<CredentialTemplate>> {
    Json(state.registry.templates())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub chain: bool,
    pub indexed_issuances: usize,
}

/// GET /healthz
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let chain = state.chain.is_healthy().await;
    Json(HealthResponse {
        status: if chain { "ok" } else { "degraded" },
        chain,
        indexed_issuances: state.registry.issuance_count(),
    })
}
