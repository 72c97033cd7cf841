//! Local persistence layer.
//!
//! Shared between the issuance pipeline (template reads) and the indexer
//! (issuance log writes, cursor). The two touch disjoint record types, so no
//! cross-component locking exists beyond the per-map concurrency of the
//! registry itself.

pub mod records;
pub mod registry;

pub use records::{CredentialTemplate, DynamicField, IssuanceLog, IssuanceStatus};
pub use registry::{Registry, StoreError};
