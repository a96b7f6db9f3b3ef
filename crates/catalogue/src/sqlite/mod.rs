//! SQLite implementation of the catalogue.

mod admin_users;
mod archive_files;
mod archive_routes;
pub(crate) mod common;
mod cursor;
mod disk_instances;
mod disk_systems;
mod drives;
mod libraries;
mod media_types;
mod mount_policies;
mod rules;
mod schema;
mod storage_classes;
mod tape_pools;
mod tapes;
mod virtual_organizations;

pub use admin_users::SqliteAdminUserRepo;
pub use archive_files::{SqliteArchiveFileRepo, SqliteFileRecycleLogRepo};
pub use archive_routes::SqliteArchiveRouteRepo;
pub use disk_instances::{SqliteDiskInstanceRepo, SqliteDiskInstanceSpaceRepo};
pub use disk_systems::SqliteDiskSystemRepo;
pub use drives::SqliteDriveStateRepo;
pub use libraries::{SqliteLogicalLibraryRepo, SqlitePhysicalLibraryRepo};
pub use media_types::SqliteMediaTypeRepo;
pub use mount_policies::{SqliteMountPolicyRepo, SqliteRequesterMountRuleRepo};
pub use storage_classes::SqliteStorageClassRepo;
pub use tape_pools::SqliteTapePoolRepo;
pub use tapes::SqliteTapeRepo;
pub use virtual_organizations::SqliteVirtualOrganizationRepo;

use crate::catalogue::Catalogue;
use crate::error::{CatalogueError, CatalogueResult};
use crate::repos::{
    AdminUserRepo, ArchiveFileRepo, ArchiveRouteRepo, DiskInstanceRepo, DiskInstanceSpaceRepo,
    DiskSystemRepo, DriveStateRepo, FileRecycleLogRepo, LogicalLibraryRepo, MediaTypeRepo,
    MountPolicyRepo, PhysicalLibraryRepo, RequesterMountRuleRepo, StorageClassRepo, TapePoolRepo,
    TapeRepo, VirtualOrganizationRepo,
};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use tapecat_core::config::CatalogueConfig;
use tapecat_core::{SCHEMA_VERSION, SchemaVersion};

/// The two connection pools backing a catalogue.
///
/// Both open the same database file. `metadata` serves every short operation
/// and all writes; `listing` is read-only and reserved for cursors so that a
/// slow listing never holds a metadata connection.
#[derive(Clone, Debug)]
pub struct CataloguePools {
    pub metadata: Pool<Sqlite>,
    pub listing: Pool<Sqlite>,
    /// Rows fetched per cursor page.
    pub listing_page_size: u32,
}

impl CataloguePools {
    /// Open both pools for the configured database file.
    pub async fn connect(config: &CatalogueConfig) -> CatalogueResult<Self> {
        let path = &config.path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                CatalogueError::Config(format!(
                    "cannot create catalogue directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout());

        let metadata = SqlitePoolOptions::new()
            .max_connections(config.max_metadata_connections)
            .acquire_timeout(config.busy_timeout())
            // A connection dropped by the server is replaced on the next acquire.
            .test_before_acquire(true)
            .connect_with(opts.clone())
            .await?;

        let listing = SqlitePoolOptions::new()
            .max_connections(config.max_listing_connections)
            .acquire_timeout(config.busy_timeout())
            .test_before_acquire(true)
            .connect_with(opts.create_if_missing(false).read_only(true))
            .await?;

        Ok(Self {
            metadata,
            listing,
            listing_page_size: config.listing_page_size,
        })
    }

    pub async fn close(&self) {
        self.listing.close().await;
        self.metadata.close().await;
    }
}

/// SQLite-backed catalogue holding one repository per entity kind.
pub struct SqliteCatalogue {
    pools: CataloguePools,
    expected_schema_version: SchemaVersion,
    admin_users: SqliteAdminUserRepo,
    vos: SqliteVirtualOrganizationRepo,
    disk_instances: SqliteDiskInstanceRepo,
    disk_instance_spaces: SqliteDiskInstanceSpaceRepo,
    disk_systems: SqliteDiskSystemRepo,
    media_types: SqliteMediaTypeRepo,
    physical_libraries: SqlitePhysicalLibraryRepo,
    logical_libraries: SqliteLogicalLibraryRepo,
    tape_pools: SqliteTapePoolRepo,
    tapes: SqliteTapeRepo,
    storage_classes: SqliteStorageClassRepo,
    archive_routes: SqliteArchiveRouteRepo,
    mount_policies: SqliteMountPolicyRepo,
    requester_mount_rules: SqliteRequesterMountRuleRepo,
    drive_state: SqliteDriveStateRepo,
    archive_files: SqliteArchiveFileRepo,
    file_recycle_log: SqliteFileRecycleLogRepo,
}

impl SqliteCatalogue {
    /// Open the catalogue, creating the schema when allowed, and check its version.
    ///
    /// A schema version mismatch is returned as [`CatalogueError::SchemaMismatch`].
    pub async fn open(config: &CatalogueConfig) -> CatalogueResult<Self> {
        config.validate().map_err(CatalogueError::Config)?;
        let pools = CataloguePools::connect(config).await?;
        if config.create_schema {
            create_schema(&pools.metadata).await?;
        }

        let catalogue = Self::with_pools(pools, config.expected_schema_version());
        catalogue.verify_schema_version().await?;

        tracing::info!(
            path = %config.path.display(),
            schema_version = %catalogue.expected_schema_version,
            "Catalogue opened"
        );
        Ok(catalogue)
    }

    /// Build a catalogue over already-open pools without touching the schema.
    pub fn with_pools(pools: CataloguePools, expected_schema_version: SchemaVersion) -> Self {
        let metadata = pools.metadata.clone();
        Self {
            admin_users: SqliteAdminUserRepo::new(metadata.clone()),
            vos: SqliteVirtualOrganizationRepo::new(metadata.clone()),
            disk_instances: SqliteDiskInstanceRepo::new(metadata.clone()),
            disk_instance_spaces: SqliteDiskInstanceSpaceRepo::new(metadata.clone()),
            disk_systems: SqliteDiskSystemRepo::new(metadata.clone()),
            media_types: SqliteMediaTypeRepo::new(metadata.clone()),
            physical_libraries: SqlitePhysicalLibraryRepo::new(metadata.clone()),
            logical_libraries: SqliteLogicalLibraryRepo::new(metadata.clone()),
            tape_pools: SqliteTapePoolRepo::new(metadata.clone()),
            tapes: SqliteTapeRepo::new(metadata.clone()),
            storage_classes: SqliteStorageClassRepo::new(metadata.clone()),
            archive_routes: SqliteArchiveRouteRepo::new(metadata.clone()),
            mount_policies: SqliteMountPolicyRepo::new(metadata.clone()),
            requester_mount_rules: SqliteRequesterMountRuleRepo::new(metadata.clone()),
            drive_state: SqliteDriveStateRepo::new(metadata),
            archive_files: SqliteArchiveFileRepo::new(pools.clone()),
            file_recycle_log: SqliteFileRecycleLogRepo::new(pools.clone()),
            pools,
            expected_schema_version,
        }
    }

    /// Get a reference to the connection pools.
    pub fn pools(&self) -> &CataloguePools {
        &self.pools
    }
}

/// Create every table that does not exist yet and seed the schema version.
pub async fn create_schema(pool: &Pool<Sqlite>) -> CatalogueResult<()> {
    sqlx::query(schema::SCHEMA_SQL).execute(pool).await?;
    sqlx::query(
        "INSERT INTO catalogue_schema_version (schema_version_major, schema_version_minor) \
         SELECT ?, ? WHERE NOT EXISTS (SELECT 1 FROM catalogue_schema_version)",
    )
    .bind(SCHEMA_VERSION.major)
    .bind(SCHEMA_VERSION.minor)
    .execute(pool)
    .await?;
    Ok(())
}

#[async_trait]
impl Catalogue for SqliteCatalogue {
    fn admin_users(&self) -> &dyn AdminUserRepo {
        &self.admin_users
    }

    fn vos(&self) -> &dyn VirtualOrganizationRepo {
        &self.vos
    }

    fn disk_instances(&self) -> &dyn DiskInstanceRepo {
        &self.disk_instances
    }

    fn disk_instance_spaces(&self) -> &dyn DiskInstanceSpaceRepo {
        &self.disk_instance_spaces
    }

    fn disk_systems(&self) -> &dyn DiskSystemRepo {
        &self.disk_systems
    }

    fn media_types(&self) -> &dyn MediaTypeRepo {
        &self.media_types
    }

    fn physical_libraries(&self) -> &dyn PhysicalLibraryRepo {
        &self.physical_libraries
    }

    fn logical_libraries(&self) -> &dyn LogicalLibraryRepo {
        &self.logical_libraries
    }

    fn tape_pools(&self) -> &dyn TapePoolRepo {
        &self.tape_pools
    }

    fn tapes(&self) -> &dyn TapeRepo {
        &self.tapes
    }

    fn storage_classes(&self) -> &dyn StorageClassRepo {
        &self.storage_classes
    }

    fn archive_routes(&self) -> &dyn ArchiveRouteRepo {
        &self.archive_routes
    }

    fn mount_policies(&self) -> &dyn MountPolicyRepo {
        &self.mount_policies
    }

    fn requester_mount_rules(&self) -> &dyn RequesterMountRuleRepo {
        &self.requester_mount_rules
    }

    fn drive_state(&self) -> &dyn DriveStateRepo {
        &self.drive_state
    }

    fn archive_files(&self) -> &dyn ArchiveFileRepo {
        &self.archive_files
    }

    fn file_recycle_log(&self) -> &dyn FileRecycleLogRepo {
        &self.file_recycle_log
    }

    async fn ping(&self) -> CatalogueResult<()> {
        sqlx::query("SELECT 1").execute(&self.pools.metadata).await?;
        Ok(())
    }

    async fn get_schema_version(&self) -> CatalogueResult<SchemaVersion> {
        let row: Option<(u32, u32)> = sqlx::query_as(
            "SELECT schema_version_major, schema_version_minor FROM catalogue_schema_version",
        )
        .fetch_optional(&self.pools.metadata)
        .await?;
        let (major, minor) = row.ok_or_else(|| {
            CatalogueError::not_found("catalogue schema version", "catalogue_schema_version")
        })?;
        Ok(SchemaVersion::new(major, minor))
    }

    async fn verify_schema_version(&self) -> CatalogueResult<()> {
        let found = self.get_schema_version().await?;
        if found != self.expected_schema_version {
            tracing::error!(
                expected = %self.expected_schema_version,
                found = %found,
                "Catalogue schema version mismatch"
            );
            return Err(CatalogueError::SchemaMismatch {
                expected: self.expected_schema_version,
                found,
            });
        }
        Ok(())
    }
}
