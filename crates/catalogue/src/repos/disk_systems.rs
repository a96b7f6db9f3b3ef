//! Disk system repository.

use crate::error::CatalogueResult;
use crate::models::{DiskSystemList, DiskSystemRow, NewDiskSystem};
use async_trait::async_trait;
use tapecat_core::SecurityIdentity;

/// Repository for disk systems, the staging buffers subject to backpressure.
#[async_trait]
pub trait DiskSystemRepo: Send + Sync {
    async fn create_disk_system(
        &self,
        admin: &SecurityIdentity,
        disk_system: &NewDiskSystem,
    ) -> CatalogueResult<()>;

    /// All disk systems, each carrying the state of its disk instance space.
    async fn get_all_disk_systems(&self) -> CatalogueResult<DiskSystemList>;

    async fn get_disk_system(&self, name: &str) -> CatalogueResult<Option<DiskSystemRow>>;

    async fn disk_system_exists(&self, name: &str) -> CatalogueResult<bool>;

    async fn modify_disk_system_file_regexp(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        file_regexp: &str,
    ) -> CatalogueResult<()>;

    async fn modify_disk_system_targeted_free_space(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        targeted_free_space: u64,
    ) -> CatalogueResult<()>;

    async fn modify_disk_system_sleep_time(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        sleep_time: u64,
    ) -> CatalogueResult<()>;

    async fn modify_disk_system_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()>;

    /// Point a disk system at another existing disk instance space.
    async fn modify_disk_system_disk_instance_space(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        disk_instance_name: &str,
        disk_instance_space_name: &str,
    ) -> CatalogueResult<()>;

    async fn delete_disk_system(&self, name: &str) -> CatalogueResult<()>;
}
