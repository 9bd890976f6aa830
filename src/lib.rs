//! Genoload: format-sniffing, idempotent loader for consumer genotyping files.
//!
//! This library detects the vendor format of a genotype export, normalizes
//! each line into a canonical variant record, and loads new variants and
//! per-subject calls into a SQLite store without duplicating earlier runs.

#![warn(missing_docs)]

pub mod cli;
pub mod dedup;
pub mod error;
pub mod event;
pub mod ingest;
pub mod store;
pub mod variant;

/// Re-export common error types for convenience.
pub use error::{IngestError, Result};

/// Re-export store types for convenience.
pub use store::Store;

/// Genoload version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
