//! The catalogue facade: one accessor per entity-kind repository.

use crate::error::CatalogueResult;
use crate::repos::{
    AdminUserRepo, ArchiveFileRepo, ArchiveRouteRepo, DiskInstanceRepo, DiskInstanceSpaceRepo,
    DiskSystemRepo, DriveStateRepo, FileRecycleLogRepo, LogicalLibraryRepo, MediaTypeRepo,
    MountPolicyRepo, PhysicalLibraryRepo, RequesterMountRuleRepo, StorageClassRepo, TapePoolRepo,
    TapeRepo, VirtualOrganizationRepo,
};
use async_trait::async_trait;
use tapecat_core::SchemaVersion;

/// Single entry point to every catalogue repository.
///
/// Implementations are safe to share between tasks; the database is the only
/// synchronisation point.
#[async_trait]
pub trait Catalogue: Send + Sync {
    fn admin_users(&self) -> &dyn AdminUserRepo;
    fn vos(&self) -> &dyn VirtualOrganizationRepo;
    fn disk_instances(&self) -> &dyn DiskInstanceRepo;
    fn disk_instance_spaces(&self) -> &dyn DiskInstanceSpaceRepo;
    fn disk_systems(&self) -> &dyn DiskSystemRepo;
    fn media_types(&self) -> &dyn MediaTypeRepo;
    fn physical_libraries(&self) -> &dyn PhysicalLibraryRepo;
    fn logical_libraries(&self) -> &dyn LogicalLibraryRepo;
    fn tape_pools(&self) -> &dyn TapePoolRepo;
    fn tapes(&self) -> &dyn TapeRepo;
    fn storage_classes(&self) -> &dyn StorageClassRepo;
    fn archive_routes(&self) -> &dyn ArchiveRouteRepo;
    fn mount_policies(&self) -> &dyn MountPolicyRepo;
    fn requester_mount_rules(&self) -> &dyn RequesterMountRuleRepo;
    fn drive_state(&self) -> &dyn DriveStateRepo;
    fn archive_files(&self) -> &dyn ArchiveFileRepo;
    fn file_recycle_log(&self) -> &dyn FileRecycleLogRepo;

    /// Cheap liveness probe of the backing database.
    async fn ping(&self) -> CatalogueResult<()>;

    /// The schema version persisted in the database.
    async fn get_schema_version(&self) -> CatalogueResult<SchemaVersion>;

    /// Fail with a schema mismatch unless the persisted version is the expected one.
    async fn verify_schema_version(&self) -> CatalogueResult<()>;
}
