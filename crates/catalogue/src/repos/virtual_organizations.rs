//! Virtual organization repository.

use crate::error::CatalogueResult;
use crate::models::{NewVirtualOrganization, VirtualOrganizationRow};
use async_trait::async_trait;
use tapecat_core::SecurityIdentity;

/// Repository for virtual organizations, the tenants owning pools and storage classes.
#[async_trait]
pub trait VirtualOrganizationRepo: Send + Sync {
    /// Create a VO. At most one VO may be flagged as the repack VO.
    async fn create_virtual_organization(
        &self,
        admin: &SecurityIdentity,
        vo: &NewVirtualOrganization,
    ) -> CatalogueResult<()>;

    async fn get_virtual_organizations(&self) -> CatalogueResult<Vec<VirtualOrganizationRow>>;

    async fn get_virtual_organization(&self, name: &str)
    -> CatalogueResult<Option<VirtualOrganizationRow>>;

    async fn get_default_virtual_organization_for_repack(
        &self,
    ) -> CatalogueResult<Option<VirtualOrganizationRow>>;

    async fn get_virtual_organization_of_tape_pool(
        &self,
        tape_pool_name: &str,
    ) -> CatalogueResult<VirtualOrganizationRow>;

    async fn modify_virtual_organization_name(
        &self,
        admin: &SecurityIdentity,
        current_name: &str,
        new_name: &str,
    ) -> CatalogueResult<()>;

    async fn modify_virtual_organization_read_max_drives(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        read_max_drives: u64,
    ) -> CatalogueResult<()>;

    async fn modify_virtual_organization_write_max_drives(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        write_max_drives: u64,
    ) -> CatalogueResult<()>;

    async fn modify_virtual_organization_max_file_size(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        max_file_size: u64,
    ) -> CatalogueResult<()>;

    async fn modify_virtual_organization_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()>;

    async fn modify_virtual_organization_disk_instance_name(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        disk_instance_name: &str,
    ) -> CatalogueResult<()>;

    async fn modify_virtual_organization_is_repack_vo(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        is_repack_vo: bool,
    ) -> CatalogueResult<()>;

    /// Delete a VO not referenced by any tape pool or storage class.
    async fn delete_virtual_organization(&self, name: &str) -> CatalogueResult<()>;
}
