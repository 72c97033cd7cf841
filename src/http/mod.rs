//! HTTP service surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, request ID)
//!     → handlers.rs (issue / verify / templates / health)
//!     → issuance pipeline, contract reads, registry
//! ```

pub mod handlers;
pub mod server;

pub use server::{ApiServer, AppState, ServicePipeline};
