//! Tape pool repository.

use crate::error::CatalogueResult;
use crate::models::{NewTapePool, TapePoolRow, TapePoolSearchCriteria};
use async_trait::async_trait;
use tapecat_core::SecurityIdentity;

/// Repository for tape pools.
#[async_trait]
pub trait TapePoolRepo: Send + Sync {
    /// Create a pool owned by an existing VO, with an optional supply list.
    async fn create_tape_pool(
        &self,
        admin: &SecurityIdentity,
        pool: &NewTapePool,
    ) -> CatalogueResult<()>;

    /// List pools with their aggregate counters and supply relationships.
    ///
    /// A criterion that is set but empty is a validation error; a name or VO
    /// criterion naming a missing entity is a not-found error.
    async fn get_tape_pools(
        &self,
        criteria: &TapePoolSearchCriteria,
    ) -> CatalogueResult<Vec<TapePoolRow>>;

    async fn get_tape_pool(&self, name: &str) -> CatalogueResult<Option<TapePoolRow>>;

    async fn tape_pool_exists(&self, name: &str) -> CatalogueResult<bool>;

    async fn modify_tape_pool_name(
        &self,
        admin: &SecurityIdentity,
        current_name: &str,
        new_name: &str,
    ) -> CatalogueResult<()>;

    async fn modify_tape_pool_vo(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        vo: &str,
    ) -> CatalogueResult<()>;

    async fn modify_tape_pool_nb_partial_tapes(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        nb_partial_tapes: u64,
    ) -> CatalogueResult<()>;

    async fn modify_tape_pool_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()>;

    async fn set_tape_pool_encryption(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        encryption: bool,
    ) -> CatalogueResult<()>;

    async fn modify_tape_pool_encryption_key_name(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        encryption_key_name: Option<&str>,
    ) -> CatalogueResult<()>;

    /// Replace the pool's supply sources with `supply`, in order.
    async fn modify_tape_pool_supply(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        supply: &[String],
    ) -> CatalogueResult<()>;

    /// Delete an empty pool that no archive route targets.
    async fn delete_tape_pool(&self, name: &str) -> CatalogueResult<()>;
}
