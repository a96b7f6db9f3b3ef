//! Archive route repository.

use crate::error::CatalogueResult;
use crate::models::{ArchiveRouteRow, NewArchiveRoute};
use async_trait::async_trait;
use tapecat_core::{ArchiveRouteType, SecurityIdentity};

/// Repository for archive routes mapping storage class copies to tape pools.
#[async_trait]
pub trait ArchiveRouteRepo: Send + Sync {
    async fn create_archive_route(
        &self,
        admin: &SecurityIdentity,
        route: &NewArchiveRoute,
    ) -> CatalogueResult<()>;

    async fn get_archive_routes(&self) -> CatalogueResult<Vec<ArchiveRouteRow>>;

    /// Routes from one storage class to one tape pool.
    async fn get_archive_routes_for(
        &self,
        storage_class_name: &str,
        tape_pool_name: &str,
    ) -> CatalogueResult<Vec<ArchiveRouteRow>>;

    async fn modify_archive_route_tape_pool_name(
        &self,
        admin: &SecurityIdentity,
        storage_class_name: &str,
        copy_nb: u32,
        route_type: ArchiveRouteType,
        tape_pool_name: &str,
    ) -> CatalogueResult<()>;

    async fn modify_archive_route_comment(
        &self,
        admin: &SecurityIdentity,
        storage_class_name: &str,
        copy_nb: u32,
        route_type: ArchiveRouteType,
        comment: &str,
    ) -> CatalogueResult<()>;

    async fn delete_archive_route(
        &self,
        storage_class_name: &str,
        copy_nb: u32,
        route_type: ArchiveRouteType,
    ) -> CatalogueResult<()>;
}
