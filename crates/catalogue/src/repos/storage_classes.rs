//! Storage class repository.

use crate::error::CatalogueResult;
use crate::models::{NewStorageClass, StorageClassRow};
use async_trait::async_trait;
use tapecat_core::SecurityIdentity;

/// Repository for storage classes.
#[async_trait]
pub trait StorageClassRepo: Send + Sync {
    async fn create_storage_class(
        &self,
        admin: &SecurityIdentity,
        storage_class: &NewStorageClass,
    ) -> CatalogueResult<()>;

    async fn get_storage_classes(&self) -> CatalogueResult<Vec<StorageClassRow>>;

    async fn get_storage_class(&self, name: &str) -> CatalogueResult<Option<StorageClassRow>>;

    async fn modify_storage_class_name(
        &self,
        admin: &SecurityIdentity,
        current_name: &str,
        new_name: &str,
    ) -> CatalogueResult<()>;

    async fn modify_storage_class_nb_copies(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        nb_copies: u64,
    ) -> CatalogueResult<()>;

    async fn modify_storage_class_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()>;

    async fn modify_storage_class_vo(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        vo: &str,
    ) -> CatalogueResult<()>;

    /// Delete a storage class no archive route, archive file or recycle-log entry uses.
    async fn delete_storage_class(&self, name: &str) -> CatalogueResult<()>;
}
