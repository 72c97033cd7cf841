//! Credential issuance service.
//!
//! # Architecture Overview
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 CERTMINT                      │
//!                       │                                               │
//!   Issue Request       │  ┌────────┐   ┌──────────┐   ┌────────────┐  │
//!   ────────────────────┼─▶│  http  │──▶│ issuance │──▶│  renderer  │  │
//!                       │  │  API   │   │ pipeline │   └────────────┘  │
//!                       │  └────────┘   │          │   ┌────────────┐  │     Pinning
//!                       │               │          │──▶│  storage   │──┼──▶  Service
//!                       │               │          │   └────────────┘  │
//!                       │               │          │   ┌────────────┐  │     Chain
//!                       │               └──────────┼──▶│   chain    │──┼──▶  Node
//!                       │                          │   └──────┬─────┘  │
//!                       │  ┌─────────┐   ┌─────────▼──┐       │        │
//!                       │  │  store  │◀──│  indexer   │◀──────┘        │
//!                       │  │registry │   │ (polling)  │   events       │
//!                       │  └─────────┘   └────────────┘                │
//!                       │                                               │
//!                       │  config · observability · lifecycle           │
//!                       └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use certmint::chain::{ChainClient, CredentialContract, Wallet};
use certmint::config::{load_config, ServiceConfig};
use certmint::http::{ApiServer, AppState};
use certmint::indexer::EventIndexer;
use certmint::issuance::IssuancePipeline;
use certmint::lifecycle::Shutdown;
use certmint::observability::{logging, metrics};
use certmint::storage::HttpContentStore;
use certmint::store::Registry;

#[derive(Parser)]
#[command(name = "certmint")]
#[command(about = "Credential issuance service", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("certmint v0.1.0 starting");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let registry = match &config.persistence.path {
        Some(path) => Registry::load_from_file(std::path::Path::new(path))?,
        None => Registry::new(None),
    };

    let chain = ChainClient::new(config.chain.clone()).await?;
    let wallet = Wallet::from_env(config.chain.chain_id)?;
    let contract_address = config.chain.contract_address.parse()?;
    let contract = CredentialContract::new(chain.clone(), wallet, contract_address)?;
    let content = HttpContentStore::new(config.storage.clone())?;

    let pipeline = Arc::new(IssuancePipeline::new(
        registry.clone(),
        content,
        contract.clone(),
    ));

    let shutdown = Shutdown::new();

    let indexer = EventIndexer::new(contract.clone(), registry.clone(), config.indexer.clone());
    tokio::spawn(indexer.run(shutdown.subscribe()));

    let state = AppState {
        pipeline,
        contract,
        chain,
        registry,
    };
    let server = ApiServer::new(state, &config.listener);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
    });

    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
