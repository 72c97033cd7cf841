//! Chain event indexer.
//!
//! A periodic pull-based reconciliation loop: chain → local mirror. Runs on
//! its own task, independent of request handling.

pub mod service;

pub use service::{EventIndexer, TickOutcome};
