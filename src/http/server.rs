//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit)
//! - Serve with graceful shutdown

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::chain::{ChainClient, CredentialContract};
use crate::config::ListenerConfig;
use crate::http::handlers;
use crate::issuance::IssuancePipeline;
use crate::storage::HttpContentStore;
use crate::store::Registry;

/// The pipeline as wired in production.
pub type ServicePipeline = IssuancePipeline<HttpContentStore, CredentialContract>;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ServicePipeline>,
    pub contract: CredentialContract,
    pub chain: ChainClient,
    pub registry: Registry,
}

/// HTTP server for the issuance API.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Build the router with middleware and handlers.
    pub fn new(state: AppState, config: &ListenerConfig) -> Self {
        let router = Router::new()
            .route("/api/credentials/issue", post(handlers::issue_credential))
            .route(
                "/api/credentials/{token_id}/verify",
                get(handlers::verify_credential),
            )
            .route(
                "/api/templates",
                post(handlers::create_template).get(handlers::list_templates),
            )
            .route("/healthz", get(handlers::health))
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .with_state(state);

        Self { router }
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> std::io::Result<()> {
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await
    }
}
