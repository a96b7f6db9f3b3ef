//! Shared harness for the free-space integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tapecat_catalogue::models::{DiskSystemList, DiskSystemRow, NewDiskInstanceSpace, NewDiskSystem};
use tapecat_catalogue::repos::{
    AdminUserRepo, ArchiveFileRepo, ArchiveRouteRepo, DiskInstanceRepo, DiskInstanceSpaceRepo,
    DiskSystemRepo, DriveStateRepo, FileRecycleLogRepo, LogicalLibraryRepo, MediaTypeRepo,
    MountPolicyRepo, PhysicalLibraryRepo, RequesterMountRuleRepo, StorageClassRepo, TapePoolRepo,
    TapeRepo, VirtualOrganizationRepo,
};
use tapecat_catalogue::{
    Catalogue, CatalogueError, CatalogueResult, RetryPolicy, RetryingCatalogue, SqliteCatalogue,
};
use tapecat_core::config::CatalogueConfig;
use tapecat_core::{SchemaVersion, SecurityIdentity};
use tempfile::TempDir;

/// A catalogue holding the disk instance `di1`, removed on drop.
pub struct TestCatalogue {
    pub catalogue: Arc<SqliteCatalogue>,
    _temp_dir: TempDir,
}

impl TestCatalogue {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let config = CatalogueConfig::for_testing(temp_dir.path().join("catalogue.db"));
        let catalogue = SqliteCatalogue::open(&config)
            .await
            .expect("Failed to open catalogue");
        catalogue
            .disk_instances()
            .create_disk_instance(&admin(), "di1", "disk instance comment")
            .await
            .expect("Create disk instance failed");
        Self {
            catalogue: Arc::new(catalogue),
            _temp_dir: temp_dir,
        }
    }

    /// The catalogue behind the retry wrapper, with a short backoff.
    pub fn retrying(&self) -> RetryingCatalogue {
        RetryingCatalogue::new(self.catalogue.clone(), test_policy())
    }

    /// Create a disk system `name` backed by its own space `<name>_space`.
    pub async fn add_disk_system(&self, name: &str, query_url: &str, targeted_free_space: u64) {
        let space = format!("{name}_space");
        self.catalogue
            .disk_instance_spaces()
            .create_disk_instance_space(
                &admin(),
                &NewDiskInstanceSpace {
                    disk_instance_name: "di1".to_string(),
                    name: space.clone(),
                    free_space_query_url: query_url.to_string(),
                    refresh_interval: 60,
                    comment: "space comment".to_string(),
                },
            )
            .await
            .expect("Create disk instance space failed");
        self.catalogue
            .disk_systems()
            .create_disk_system(
                &admin(),
                &NewDiskSystem {
                    name: name.to_string(),
                    file_regexp: format!("^root://{name}/"),
                    disk_instance_name: "di1".to_string(),
                    disk_instance_space_name: space,
                    targeted_free_space,
                    sleep_time: 15,
                    comment: "disk system comment".to_string(),
                },
            )
            .await
            .expect("Create disk system failed");
    }
}

pub fn test_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1))
}

pub fn admin() -> SecurityIdentity {
    SecurityIdentity::new("admin1", "host1")
}

pub fn names(names: &[&str]) -> std::collections::BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn lost() -> CatalogueError {
    CatalogueError::ConnectionLost("connection reset by peer".to_string())
}

/// Disk system repository that loses its connection on the first calls to
/// `get_all_disk_systems`.
pub struct DroppingDiskSystems {
    inner: Arc<SqliteCatalogue>,
    losses_left: AtomicU32,
    pub listings: AtomicU32,
}

#[async_trait]
impl DiskSystemRepo for DroppingDiskSystems {
    async fn create_disk_system(
        &self,
        admin: &SecurityIdentity,
        disk_system: &NewDiskSystem,
    ) -> CatalogueResult<()> {
        self.inner.disk_systems().create_disk_system(admin, disk_system).await
    }

    async fn get_all_disk_systems(&self) -> CatalogueResult<DiskSystemList> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        let dropped = self
            .losses_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if dropped {
            return Err(lost());
        }
        self.inner.disk_systems().get_all_disk_systems().await
    }

    async fn get_disk_system(&self, name: &str) -> CatalogueResult<Option<DiskSystemRow>> {
        self.inner.disk_systems().get_disk_system(name).await
    }

    async fn disk_system_exists(&self, name: &str) -> CatalogueResult<bool> {
        self.inner.disk_systems().disk_system_exists(name).await
    }

    async fn modify_disk_system_file_regexp(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        file_regexp: &str,
    ) -> CatalogueResult<()> {
        self.inner
            .disk_systems()
            .modify_disk_system_file_regexp(admin, name, file_regexp)
            .await
    }

    async fn modify_disk_system_targeted_free_space(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        targeted_free_space: u64,
    ) -> CatalogueResult<()> {
        self.inner
            .disk_systems()
            .modify_disk_system_targeted_free_space(admin, name, targeted_free_space)
            .await
    }

    async fn modify_disk_system_sleep_time(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        sleep_time: u64,
    ) -> CatalogueResult<()> {
        self.inner
            .disk_systems()
            .modify_disk_system_sleep_time(admin, name, sleep_time)
            .await
    }

    async fn modify_disk_system_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()> {
        self.inner
            .disk_systems()
            .modify_disk_system_comment(admin, name, comment)
            .await
    }

    async fn modify_disk_system_disk_instance_space(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        disk_instance_name: &str,
        disk_instance_space_name: &str,
    ) -> CatalogueResult<()> {
        self.inner
            .disk_systems()
            .modify_disk_system_disk_instance_space(
                admin,
                name,
                disk_instance_name,
                disk_instance_space_name,
            )
            .await
    }

    async fn delete_disk_system(&self, name: &str) -> CatalogueResult<()> {
        self.inner.disk_systems().delete_disk_system(name).await
    }
}

/// A catalogue whose disk system listing loses its connection `losses` times
/// before answering; everything else is served by the SQLite catalogue.
pub struct DroppingCatalogue {
    inner: Arc<SqliteCatalogue>,
    pub disk_systems: DroppingDiskSystems,
}

impl DroppingCatalogue {
    pub fn new(inner: Arc<SqliteCatalogue>, losses: u32) -> Self {
        Self {
            disk_systems: DroppingDiskSystems {
                inner: Arc::clone(&inner),
                losses_left: AtomicU32::new(losses),
                listings: AtomicU32::new(0),
            },
            inner,
        }
    }
}

#[async_trait]
impl Catalogue for DroppingCatalogue {
    fn admin_users(&self) -> &dyn AdminUserRepo {
        self.inner.admin_users()
    }

    fn vos(&self) -> &dyn VirtualOrganizationRepo {
        self.inner.vos()
    }

    fn disk_instances(&self) -> &dyn DiskInstanceRepo {
        self.inner.disk_instances()
    }

    fn disk_instance_spaces(&self) -> &dyn DiskInstanceSpaceRepo {
        self.inner.disk_instance_spaces()
    }

    fn disk_systems(&self) -> &dyn DiskSystemRepo {
        &self.disk_systems
    }

    fn media_types(&self) -> &dyn MediaTypeRepo {
        self.inner.media_types()
    }

    fn physical_libraries(&self) -> &dyn PhysicalLibraryRepo {
        self.inner.physical_libraries()
    }

    fn logical_libraries(&self) -> &dyn LogicalLibraryRepo {
        self.inner.logical_libraries()
    }

    fn tape_pools(&self) -> &dyn TapePoolRepo {
        self.inner.tape_pools()
    }

    fn tapes(&self) -> &dyn TapeRepo {
        self.inner.tapes()
    }

    fn storage_classes(&self) -> &dyn StorageClassRepo {
        self.inner.storage_classes()
    }

    fn archive_routes(&self) -> &dyn ArchiveRouteRepo {
        self.inner.archive_routes()
    }

    fn mount_policies(&self) -> &dyn MountPolicyRepo {
        self.inner.mount_policies()
    }

    fn requester_mount_rules(&self) -> &dyn RequesterMountRuleRepo {
        self.inner.requester_mount_rules()
    }

    fn drive_state(&self) -> &dyn DriveStateRepo {
        self.inner.drive_state()
    }

    fn archive_files(&self) -> &dyn ArchiveFileRepo {
        self.inner.archive_files()
    }

    fn file_recycle_log(&self) -> &dyn FileRecycleLogRepo {
        self.inner.file_recycle_log()
    }

    async fn ping(&self) -> CatalogueResult<()> {
        self.inner.ping().await
    }

    async fn get_schema_version(&self) -> CatalogueResult<SchemaVersion> {
        self.inner.get_schema_version().await
    }

    async fn verify_schema_version(&self) -> CatalogueResult<()> {
        self.inner.verify_schema_version().await
    }
}
