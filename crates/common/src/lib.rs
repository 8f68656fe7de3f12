//! tlverify Common Library
//!
//! Configuration, error types and the static asset reference check:
//! extraction of image references from data sources and reconciliation
//! against the files in the asset directory.

pub mod config;
pub mod error;
pub mod extract;
pub mod reconcile;
pub mod types;

// Re-export commonly used types
pub use config::{AssetsConfig, BrowserConfig, Config, DEFAULT_CONFIG_FILE};
pub use error::{Error, Result};
pub use extract::ReferenceExtractor;
pub use reconcile::{check_assets, Reconciler};
pub use types::*;

/// tlverify version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
