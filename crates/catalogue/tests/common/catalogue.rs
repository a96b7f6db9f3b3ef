//! Catalogue test utilities.

use std::sync::Arc;
use tapecat_catalogue::{Catalogue, CatalogueResult, SqliteCatalogue};
use tapecat_core::config::CatalogueConfig;
use tempfile::TempDir;

/// A catalogue in a temporary directory, removed on drop.
#[allow(dead_code)]
pub struct TestCatalogue {
    pub catalogue: Arc<SqliteCatalogue>,
    pub config: CatalogueConfig,
    _temp_dir: TempDir,
}

impl TestCatalogue {
    /// Create a fresh catalogue with the current schema.
    pub async fn new() -> CatalogueResult<Self> {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let config = CatalogueConfig::for_testing(temp_dir.path().join("catalogue.db"));
        let catalogue = SqliteCatalogue::open(&config).await?;
        Ok(Self {
            catalogue: Arc::new(catalogue),
            config,
            _temp_dir: temp_dir,
        })
    }

    /// The catalogue behind its facade trait.
    pub fn catalogue(&self) -> Arc<dyn Catalogue> {
        self.catalogue.clone()
    }
}
