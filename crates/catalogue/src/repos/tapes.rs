//! Tape repository.

use crate::error::CatalogueResult;
use crate::models::{NewTape, TapeRow, TapeSearchCriteria};
use async_trait::async_trait;
use tapecat_core::{SecurityIdentity, TapeState};

/// Repository for tape cartridges and their lifecycle events.
#[async_trait]
pub trait TapeRepo: Send + Sync {
    /// Create an empty tape. Capacity is copied from the media type.
    async fn create_tape(&self, admin: &SecurityIdentity, tape: &NewTape) -> CatalogueResult<()>;

    async fn get_tapes(&self, criteria: &TapeSearchCriteria) -> CatalogueResult<Vec<TapeRow>>;

    async fn get_tape(&self, vid: &str) -> CatalogueResult<Option<TapeRow>>;

    /// Fetch several tapes; every vid must exist.
    async fn get_tapes_by_vids(&self, vids: &[String]) -> CatalogueResult<Vec<TapeRow>>;

    async fn tape_exists(&self, vid: &str) -> CatalogueResult<bool>;

    /// Move a tape to another media type, re-deriving its capacity.
    async fn modify_tape_media_type(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        media_type: &str,
    ) -> CatalogueResult<()>;

    async fn modify_tape_vendor(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        vendor: &str,
    ) -> CatalogueResult<()>;

    async fn modify_tape_logical_library_name(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        logical_library: &str,
    ) -> CatalogueResult<()>;

    async fn modify_tape_tape_pool_name(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        tape_pool: &str,
    ) -> CatalogueResult<()>;

    async fn modify_tape_encryption_key_name(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        encryption_key_name: Option<&str>,
    ) -> CatalogueResult<()>;

    async fn modify_tape_purchase_order(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        purchase_order: Option<&str>,
    ) -> CatalogueResult<()>;

    async fn modify_tape_verification_status(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        verification_status: Option<&str>,
    ) -> CatalogueResult<()>;

    async fn modify_tape_comment(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        comment: Option<&str>,
    ) -> CatalogueResult<()>;

    /// Change a tape's state.
    ///
    /// When `prev_state` is given the change only happens if the tape is still
    /// in that state; otherwise it fails with a conflict.
    async fn modify_tape_state(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        prev_state: Option<TapeState>,
        new_state: TapeState,
        reason: Option<&str>,
    ) -> CatalogueResult<()>;

    async fn set_tape_full(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        full: bool,
    ) -> CatalogueResult<()>;

    async fn set_tape_read_only(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        read_only: bool,
    ) -> CatalogueResult<()>;

    async fn set_tape_dirty(&self, vid: &str, dirty: bool) -> CatalogueResult<()>;

    /// A drive reported end of medium while writing.
    async fn no_space_left_on_tape(&self, vid: &str) -> CatalogueResult<()>;

    async fn tape_labelled(&self, vid: &str, drive_name: &str) -> CatalogueResult<()>;

    async fn tape_mounted_for_archive(&self, vid: &str, drive_name: &str) -> CatalogueResult<()>;

    async fn tape_mounted_for_retrieve(&self, vid: &str, drive_name: &str) -> CatalogueResult<()>;

    /// Return a full tape with no live files to the empty state.
    async fn reclaim_tape(&self, admin: &SecurityIdentity, vid: &str) -> CatalogueResult<()>;

    /// Active, writable tapes of an enabled logical library.
    async fn get_tapes_for_writing(&self, logical_library: &str) -> CatalogueResult<Vec<TapeRow>>;

    /// Delete a tape with no tape files and no recycle-log entries.
    async fn delete_tape(&self, vid: &str) -> CatalogueResult<()>;
}
