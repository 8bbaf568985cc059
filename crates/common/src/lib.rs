//! Journal Common Library
//!
//! Shared code for the journal platform services including:
//! - Database models and repository patterns
//! - Catalog queries and archive grouping
//! - Citation sync against an external bibliographic search
//! - Error types and handling
//! - Configuration management
//! - Site-settings resolution
//! - Metrics and observability

pub mod catalog;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod scholar;
pub mod settings;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};
pub use scholar::{BibliographicSearch, CitationSyncService};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default page size for article listings
pub const DEFAULT_LIST_LIMIT: u64 = 10;

/// Hard cap for article listings
pub const MAX_LIST_LIMIT: u64 = 100;
