//! Drive state, drive configuration and disk space reservations.

use crate::error::CatalogueResult;
use crate::models::{DriveConfigRow, DriveStatusUpdate, NewTapeDrive, TapeDriveRow};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tapecat_core::SecurityIdentity;

/// Bytes reserved per disk system by drives that are retrieving to disk.
pub type DiskSpaceReservations = BTreeMap<String, u64>;

/// Repository for tape drives as seen by the scheduler.
#[async_trait]
pub trait DriveStateRepo: Send + Sync {
    async fn create_tape_drive(
        &self,
        admin: &SecurityIdentity,
        drive: &NewTapeDrive,
    ) -> CatalogueResult<()>;

    async fn get_tape_drive(&self, drive_name: &str) -> CatalogueResult<Option<TapeDriveRow>>;

    async fn get_tape_drives(&self) -> CatalogueResult<Vec<TapeDriveRow>>;

    async fn get_tape_drive_names(&self) -> CatalogueResult<Vec<String>>;

    /// Record what an operator wants the drive to do next.
    async fn set_desired_tape_drive_state(
        &self,
        admin: &SecurityIdentity,
        drive_name: &str,
        up: bool,
        force_down: bool,
        reason: Option<&str>,
    ) -> CatalogueResult<()>;

    async fn update_tape_drive_status(
        &self,
        drive_name: &str,
        update: &DriveStatusUpdate,
    ) -> CatalogueResult<()>;

    async fn delete_tape_drive(&self, drive_name: &str) -> CatalogueResult<()>;

    /// Add `bytes` to the drive's reservation on a disk system.
    async fn reserve_disk_space(
        &self,
        drive_name: &str,
        disk_system_name: &str,
        bytes: u64,
    ) -> CatalogueResult<()>;

    /// Remove up to `bytes` from the drive's reservation on a disk system.
    async fn release_disk_space(
        &self,
        drive_name: &str,
        disk_system_name: &str,
        bytes: u64,
    ) -> CatalogueResult<()>;

    /// Total reserved bytes per disk system across all drives.
    async fn get_disk_space_reservations(&self) -> CatalogueResult<DiskSpaceReservations>;

    /// Insert or replace one configuration entry of a drive.
    async fn set_drive_config(&self, entry: &DriveConfigRow) -> CatalogueResult<()>;

    async fn get_drive_config(
        &self,
        drive_name: &str,
        key_name: &str,
    ) -> CatalogueResult<Option<DriveConfigRow>>;

    async fn get_drive_configs(&self) -> CatalogueResult<Vec<DriveConfigRow>>;

    async fn delete_drive_config(&self, drive_name: &str, key_name: &str) -> CatalogueResult<()>;
}
