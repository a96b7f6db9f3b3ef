//! Metadata catalogue for a tape archive.
//!
//! This crate provides:
//! - One repository per entity kind, with field-level validation
//! - Cross-entity consistency rules checked on create, modify and delete
//! - The [`Catalogue`] facade and its schema version check
//! - Retry of calls that lose their database connection
//! - Lazy cursors for large listings

pub mod catalogue;
pub mod cursor;
pub mod error;
pub mod metrics;
pub mod models;
pub mod repos;
pub mod retry;
pub mod sqlite;
pub mod validate;

pub use catalogue::Catalogue;
pub use cursor::{BoxCursor, CatalogueCursor};
pub use error::{CatalogueError, CatalogueResult, ErrorKind};
pub use retry::{RetryPolicy, RetryingCatalogue, RetryingCursor};
pub use sqlite::{CataloguePools, SqliteCatalogue};

use std::sync::Arc;
use tapecat_core::config::CatalogueConfig;

/// Open the catalogue described by `config`.
pub async fn open(config: &CatalogueConfig) -> CatalogueResult<Arc<dyn Catalogue>> {
    let catalogue = SqliteCatalogue::open(config).await?;
    Ok(Arc::new(catalogue) as Arc<dyn Catalogue>)
}

/// Open the catalogue with the configured retry policy applied to opening and
/// to every later call made through the returned wrapper.
pub async fn open_with_retry(config: &CatalogueConfig) -> CatalogueResult<RetryingCatalogue> {
    let policy = RetryPolicy::from_config(config);
    let catalogue = policy.run(|| SqliteCatalogue::open(config)).await?;
    Ok(RetryingCatalogue::new(Arc::new(catalogue), policy))
}
