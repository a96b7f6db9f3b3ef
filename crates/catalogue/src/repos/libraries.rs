//! Physical and logical library repositories.

use crate::error::CatalogueResult;
use crate::models::{
    LogicalLibraryRow, NewLogicalLibrary, NewPhysicalLibrary, PhysicalLibraryRow,
    PhysicalLibraryUpdate,
};
use async_trait::async_trait;
use tapecat_core::SecurityIdentity;

/// Repository for physical tape libraries.
#[async_trait]
pub trait PhysicalLibraryRepo: Send + Sync {
    async fn create_physical_library(
        &self,
        admin: &SecurityIdentity,
        library: &NewPhysicalLibrary,
    ) -> CatalogueResult<()>;

    async fn get_physical_libraries(&self) -> CatalogueResult<Vec<PhysicalLibraryRow>>;

    /// Apply every field set in `update`, validating each one.
    async fn modify_physical_library(
        &self,
        admin: &SecurityIdentity,
        update: &PhysicalLibraryUpdate,
    ) -> CatalogueResult<()>;

    /// Delete a physical library no logical library refers to.
    async fn delete_physical_library(&self, name: &str) -> CatalogueResult<()>;
}

/// Repository for logical libraries, the partitions tapes and drives belong to.
#[async_trait]
pub trait LogicalLibraryRepo: Send + Sync {
    async fn create_logical_library(
        &self,
        admin: &SecurityIdentity,
        library: &NewLogicalLibrary,
    ) -> CatalogueResult<()>;

    async fn get_logical_libraries(&self) -> CatalogueResult<Vec<LogicalLibraryRow>>;

    async fn modify_logical_library_name(
        &self,
        admin: &SecurityIdentity,
        current_name: &str,
        new_name: &str,
    ) -> CatalogueResult<()>;

    async fn modify_logical_library_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()>;

    async fn modify_logical_library_disabled_reason(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        reason: &str,
    ) -> CatalogueResult<()>;

    /// Attach the logical library to a physical library, or detach it with `None`.
    async fn modify_logical_library_physical_library(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        physical_library_name: Option<&str>,
    ) -> CatalogueResult<()>;

    /// Enable or disable a library. Enabling clears the disabled reason.
    async fn set_logical_library_disabled(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        disabled: bool,
        reason: Option<&str>,
    ) -> CatalogueResult<()>;

    /// Delete a logical library that holds no tapes.
    async fn delete_logical_library(&self, name: &str) -> CatalogueResult<()>;
}
