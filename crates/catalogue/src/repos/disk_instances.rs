//! Disk instance and disk instance space repositories.

use crate::error::CatalogueResult;
use crate::models::{DiskInstanceRow, DiskInstanceSpaceRow, NewDiskInstanceSpace};
use async_trait::async_trait;
use tapecat_core::SecurityIdentity;

/// Repository for disk instances, the namespaces of disk buffers.
#[async_trait]
pub trait DiskInstanceRepo: Send + Sync {
    async fn create_disk_instance(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()>;

    async fn get_all_disk_instances(&self) -> CatalogueResult<Vec<DiskInstanceRow>>;

    async fn modify_disk_instance_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()>;

    /// Delete a disk instance not referenced by any VO or disk instance space.
    async fn delete_disk_instance(&self, name: &str) -> CatalogueResult<()>;
}

/// Repository for the named spaces inside a disk instance.
#[async_trait]
pub trait DiskInstanceSpaceRepo: Send + Sync {
    async fn create_disk_instance_space(
        &self,
        admin: &SecurityIdentity,
        space: &NewDiskInstanceSpace,
    ) -> CatalogueResult<()>;

    async fn get_all_disk_instance_spaces(&self) -> CatalogueResult<Vec<DiskInstanceSpaceRow>>;

    async fn modify_disk_instance_space_query_url(
        &self,
        admin: &SecurityIdentity,
        disk_instance_name: &str,
        name: &str,
        free_space_query_url: &str,
    ) -> CatalogueResult<()>;

    async fn modify_disk_instance_space_refresh_interval(
        &self,
        admin: &SecurityIdentity,
        disk_instance_name: &str,
        name: &str,
        refresh_interval: u64,
    ) -> CatalogueResult<()>;

    async fn modify_disk_instance_space_comment(
        &self,
        admin: &SecurityIdentity,
        disk_instance_name: &str,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()>;

    /// Record a freshly probed free-space value.
    ///
    /// Sets the free space and its refresh time only; the modification log is
    /// left untouched.
    async fn update_disk_instance_space_free_space(
        &self,
        disk_instance_name: &str,
        name: &str,
        free_space: u64,
    ) -> CatalogueResult<()>;

    /// Delete a space not referenced by any disk system.
    async fn delete_disk_instance_space(
        &self,
        disk_instance_name: &str,
        name: &str,
    ) -> CatalogueResult<()>;
}
