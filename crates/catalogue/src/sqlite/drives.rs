//! Tape drive state, drive configuration and disk space reservations.

use super::common::{self, LOGICAL_LIBRARY, TAPE_DRIVE};
use crate::error::{CatalogueError, CatalogueResult};
use crate::models::{DriveConfigRow, DriveStatusUpdate, NewTapeDrive, TapeDriveRow};
use crate::repos::{DiskSpaceReservations, DriveStateRepo};
use crate::validate;
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};
use tapecat_core::{DriveStatus, MountType, SecurityIdentity};

const SELECT_TAPE_DRIVE: &str = "SELECT drive_name, host, logical_library, mount_type, \
    drive_status, desired_up, desired_force_down, reason_up_down, current_vid, \
    current_tape_pool, session_id, bytes_transferred, files_transferred, dev_file_name, \
    raw_library_slot, user_comment AS comment, creation_log_user_name, creation_log_host_name, \
    creation_log_time, last_update_user_name, last_update_host_name, last_update_time \
    FROM tape_drive";

pub struct SqliteDriveStateRepo {
    pool: Pool<Sqlite>,
}

impl SqliteDriveStateRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriveStateRepo for SqliteDriveStateRepo {
    async fn create_tape_drive(
        &self,
        admin: &SecurityIdentity,
        drive: &NewTapeDrive,
    ) -> CatalogueResult<()> {
        validate::non_empty("drive_name", &drive.drive_name)?;
        validate::non_empty("host", &drive.host)?;
        validate::non_empty("logical_library", &drive.logical_library)?;
        validate::non_empty_if_set("dev_file_name", drive.dev_file_name.as_deref())?;
        validate::non_empty_if_set("raw_library_slot", drive.raw_library_slot.as_deref())?;
        let comment = drive.comment.as_deref().map(|c| validate::truncate("comment", c));

        let mut tx = self.pool.begin().await?;
        common::require(&mut *tx, LOGICAL_LIBRARY, &drive.logical_library).await?;
        if common::exists(&mut *tx, TAPE_DRIVE, &drive.drive_name).await? {
            return Err(CatalogueError::already_exists(TAPE_DRIVE.kind, &drive.drive_name));
        }
        let now = common::now();
        sqlx::query(
            "INSERT INTO tape_drive (drive_name, host, logical_library, mount_type, drive_status, \
             dev_file_name, raw_library_slot, user_comment, creation_log_user_name, \
             creation_log_host_name, creation_log_time, last_update_user_name, \
             last_update_host_name, last_update_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&drive.drive_name)
        .bind(&drive.host)
        .bind(&drive.logical_library)
        .bind(MountType::NoMount.as_str())
        .bind(DriveStatus::Down.as_str())
        .bind(&drive.dev_file_name)
        .bind(&drive.raw_library_slot)
        .bind(comment)
        .bind(&admin.username)
        .bind(&admin.host)
        .bind(now)
        .bind(&admin.username)
        .bind(&admin.host)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::debug!(drive = %drive.drive_name, host = %drive.host, "Tape drive created");
        Ok(())
    }

    async fn get_tape_drive(&self, drive_name: &str) -> CatalogueResult<Option<TapeDriveRow>> {
        let sql = format!("{SELECT_TAPE_DRIVE} WHERE drive_name = ?");
        let row = sqlx::query_as::<_, TapeDriveRow>(&sql)
            .bind(drive_name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_tape_drives(&self) -> CatalogueResult<Vec<TapeDriveRow>> {
        let sql = format!("{SELECT_TAPE_DRIVE} ORDER BY drive_name");
        let rows = sqlx::query_as::<_, TapeDriveRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_tape_drive_names(&self) -> CatalogueResult<Vec<String>> {
        let names = sqlx::query_scalar("SELECT drive_name FROM tape_drive ORDER BY drive_name")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    async fn set_desired_tape_drive_state(
        &self,
        admin: &SecurityIdentity,
        drive_name: &str,
        up: bool,
        force_down: bool,
        reason: Option<&str>,
    ) -> CatalogueResult<()> {
        validate::non_empty("drive_name", drive_name)?;
        if up && force_down {
            return Err(CatalogueError::invalid(
                "force_down",
                "a drive cannot be both up and forced down",
            ));
        }
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| validate::truncate("reason", r));

        let result = sqlx::query(
            "UPDATE tape_drive SET desired_up = ?, desired_force_down = ?, reason_up_down = ?, \
             last_update_user_name = ?, last_update_host_name = ?, last_update_time = ? \
             WHERE drive_name = ?",
        )
        .bind(up)
        .bind(force_down)
        .bind(reason)
        .bind(&admin.username)
        .bind(&admin.host)
        .bind(common::now())
        .bind(drive_name)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogueError::not_found(TAPE_DRIVE.kind, drive_name));
        }

        tracing::info!(drive = %drive_name, up, force_down, "Desired drive state set");
        Ok(())
    }

    async fn update_tape_drive_status(
        &self,
        drive_name: &str,
        update: &DriveStatusUpdate,
    ) -> CatalogueResult<()> {
        validate::non_empty("drive_name", drive_name)?;
        validate::non_empty_if_set("current_vid", update.current_vid.as_deref())?;
        validate::non_empty_if_set("current_tape_pool", update.current_tape_pool.as_deref())?;
        let bytes = validate::to_db("bytes_transferred", update.bytes_transferred)?;
        let files = validate::to_db("files_transferred", update.files_transferred)?;

        let result = sqlx::query(
            "UPDATE tape_drive SET drive_status = ?, mount_type = ?, current_vid = ?, \
             current_tape_pool = ?, session_id = ?, bytes_transferred = ?, files_transferred = ? \
             WHERE drive_name = ?",
        )
        .bind(update.status.as_str())
        .bind(update.mount_type.as_str())
        .bind(&update.current_vid)
        .bind(&update.current_tape_pool)
        .bind(update.session_id)
        .bind(bytes)
        .bind(files)
        .bind(drive_name)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogueError::not_found(TAPE_DRIVE.kind, drive_name));
        }
        Ok(())
    }

    async fn delete_tape_drive(&self, drive_name: &str) -> CatalogueResult<()> {
        // Reservations go with the drive through ON DELETE CASCADE.
        common::delete_row(&self.pool, TAPE_DRIVE, drive_name).await
    }

    async fn reserve_disk_space(
        &self,
        drive_name: &str,
        disk_system_name: &str,
        bytes: u64,
    ) -> CatalogueResult<()> {
        validate::non_empty("drive_name", drive_name)?;
        validate::non_empty("disk_system_name", disk_system_name)?;
        let bytes = validate::to_db("bytes", bytes)?;

        let mut tx = self.pool.begin().await?;
        common::require(&mut *tx, TAPE_DRIVE, drive_name).await?;
        sqlx::query(
            "INSERT INTO disk_space_reservation (drive_name, disk_system_name, reserved_bytes) \
             VALUES (?1, ?2, ?3) \
             ON CONFLICT (drive_name, disk_system_name) \
             DO UPDATE SET reserved_bytes = reserved_bytes + ?3",
        )
        .bind(drive_name)
        .bind(disk_system_name)
        .bind(bytes)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::debug!(drive = %drive_name, disk_system = %disk_system_name, bytes, "Disk space reserved");
        Ok(())
    }

    async fn release_disk_space(
        &self,
        drive_name: &str,
        disk_system_name: &str,
        bytes: u64,
    ) -> CatalogueResult<()> {
        validate::non_empty("drive_name", drive_name)?;
        validate::non_empty("disk_system_name", disk_system_name)?;
        let bytes = validate::to_db("bytes", bytes)?;

        let mut tx = self.pool.begin().await?;
        common::require(&mut *tx, TAPE_DRIVE, drive_name).await?;
        let reserved: Option<i64> = sqlx::query_scalar(
            "SELECT reserved_bytes FROM disk_space_reservation \
             WHERE drive_name = ? AND disk_system_name = ?",
        )
        .bind(drive_name)
        .bind(disk_system_name)
        .fetch_optional(&mut *tx)
        .await?;
        let reserved = reserved.unwrap_or(0);
        if bytes > reserved {
            tracing::warn!(
                drive = %drive_name,
                disk_system = %disk_system_name,
                reserved,
                released = bytes,
                "Releasing more disk space than was reserved"
            );
        }

        let remaining = (reserved - bytes).max(0);
        if remaining == 0 {
            sqlx::query(
                "DELETE FROM disk_space_reservation WHERE drive_name = ? AND disk_system_name = ?",
            )
            .bind(drive_name)
            .bind(disk_system_name)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                "UPDATE disk_space_reservation SET reserved_bytes = ? \
                 WHERE drive_name = ? AND disk_system_name = ?",
            )
            .bind(remaining)
            .bind(drive_name)
            .bind(disk_system_name)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn get_disk_space_reservations(&self) -> CatalogueResult<DiskSpaceReservations> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT disk_system_name, COALESCE(SUM(reserved_bytes), 0) \
             FROM disk_space_reservation GROUP BY disk_system_name",
        )
        .fetch_all(&self.pool)
        .await?;
        let reservations = rows
            .into_iter()
            .map(|(name, bytes)| (name, u64::try_from(bytes).unwrap_or(0)))
            .collect();
        Ok(reservations)
    }

    async fn set_drive_config(&self, entry: &DriveConfigRow) -> CatalogueResult<()> {
        validate::non_empty("drive_name", &entry.drive_name)?;
        validate::non_empty("key_name", &entry.key_name)?;
        sqlx::query(
            "INSERT INTO drive_config (drive_name, key_name, category, value, source) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (drive_name, key_name) \
             DO UPDATE SET category = excluded.category, value = excluded.value, \
             source = excluded.source",
        )
        .bind(&entry.drive_name)
        .bind(&entry.key_name)
        .bind(&entry.category)
        .bind(&entry.value)
        .bind(&entry.source)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_drive_config(
        &self,
        drive_name: &str,
        key_name: &str,
    ) -> CatalogueResult<Option<DriveConfigRow>> {
        let row = sqlx::query_as::<_, DriveConfigRow>(
            "SELECT drive_name, key_name, category, value, source FROM drive_config \
             WHERE drive_name = ? AND key_name = ?",
        )
        .bind(drive_name)
        .bind(key_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_drive_configs(&self) -> CatalogueResult<Vec<DriveConfigRow>> {
        let rows = sqlx::query_as::<_, DriveConfigRow>(
            "SELECT drive_name, key_name, category, value, source FROM drive_config \
             ORDER BY drive_name, key_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_drive_config(&self, drive_name: &str, key_name: &str) -> CatalogueResult<()> {
        let result = sqlx::query("DELETE FROM drive_config WHERE drive_name = ? AND key_name = ?")
            .bind(drive_name)
            .bind(key_name)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogueError::not_found(
                "drive config",
                format!("{drive_name}:{key_name}"),
            ));
        }
        Ok(())
    }
}
