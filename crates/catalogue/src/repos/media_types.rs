//! Media type repository.

use crate::error::CatalogueResult;
use crate::models::{MediaTypeRow, NewMediaType};
use async_trait::async_trait;
use tapecat_core::SecurityIdentity;

/// Repository for cartridge media types.
#[async_trait]
pub trait MediaTypeRepo: Send + Sync {
    async fn create_media_type(
        &self,
        admin: &SecurityIdentity,
        media_type: &NewMediaType,
    ) -> CatalogueResult<()>;

    async fn get_media_types(&self) -> CatalogueResult<Vec<MediaTypeRow>>;

    async fn get_media_type_by_vid(&self, vid: &str) -> CatalogueResult<MediaTypeRow>;

    async fn modify_media_type_name(
        &self,
        admin: &SecurityIdentity,
        current_name: &str,
        new_name: &str,
    ) -> CatalogueResult<()>;

    async fn modify_media_type_cartridge(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        cartridge: &str,
    ) -> CatalogueResult<()>;

    /// Change the nominal capacity. Existing tapes keep the capacity they were created with.
    async fn modify_media_type_capacity_in_bytes(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        capacity_in_bytes: u64,
    ) -> CatalogueResult<()>;

    async fn modify_media_type_primary_density_code(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        code: u8,
    ) -> CatalogueResult<()>;

    async fn modify_media_type_secondary_density_code(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        code: u8,
    ) -> CatalogueResult<()>;

    async fn modify_media_type_nb_wraps(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        nb_wraps: Option<u32>,
    ) -> CatalogueResult<()>;

    async fn modify_media_type_min_lpos(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        min_lpos: Option<u32>,
    ) -> CatalogueResult<()>;

    async fn modify_media_type_max_lpos(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        max_lpos: Option<u32>,
    ) -> CatalogueResult<()>;

    async fn modify_media_type_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()>;

    /// Delete a media type no tape uses.
    async fn delete_media_type(&self, name: &str) -> CatalogueResult<()>;
}
