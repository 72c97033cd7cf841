//! Credential issuance subsystem.
//!
//! # Data Flow
//! ```text
//! IssuanceRequest
//!     → pipeline.rs (load template, render, pin, mint)
//!     → metadata.rs (document shape)
//!     → chain::contract (mint + confirmation)
//! ```

pub mod metadata;
pub mod pipeline;
pub mod types;

pub use metadata::{build_metadata, CredentialAttribute, CredentialMetadata, CID_SCHEME};
pub use pipeline::IssuancePipeline;
pub use types::{IssuanceRequest, IssueError};
