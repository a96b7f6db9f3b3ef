//! Physical and logical libraries.

use super::common::{self, LOGICAL_LIBRARY, PHYSICAL_LIBRARY};
use super::rules;
use crate::error::{CatalogueError, CatalogueResult};
use crate::models::{
    LogicalLibraryRow, NewLogicalLibrary, NewPhysicalLibrary, PhysicalLibraryRow,
    PhysicalLibraryUpdate,
};
use crate::repos::{LogicalLibraryRepo, PhysicalLibraryRepo};
use crate::validate;
use async_trait::async_trait;
use sqlx::sqlite::SqliteConnection;
use sqlx::{Pool, Sqlite};
use tapecat_core::SecurityIdentity;

// =============================================================================
// Physical libraries
// =============================================================================

pub struct SqlitePhysicalLibraryRepo {
    pool: Pool<Sqlite>,
}

impl SqlitePhysicalLibraryRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

fn non_zero_slots(field: &'static str, value: u32) -> CatalogueResult<()> {
    validate::non_zero(field, u64::from(value))
}

/// Apply one optional string field of a physical library update.
async fn set_text(
    conn: &mut SqliteConnection,
    admin: &SecurityIdentity,
    name: &str,
    field: &'static str,
    column: &'static str,
    value: Option<&String>,
) -> CatalogueResult<bool> {
    let Some(value) = value else {
        return Ok(false);
    };
    validate::non_empty(field, value)?;
    let value = validate::truncate(field, value);
    common::update_column(&mut *conn, PHYSICAL_LIBRARY, name, column, value, admin).await?;
    Ok(true)
}

#[async_trait]
impl PhysicalLibraryRepo for SqlitePhysicalLibraryRepo {
    async fn create_physical_library(
        &self,
        admin: &SecurityIdentity,
        lib: &NewPhysicalLibrary,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", &lib.name)?;
        validate::non_empty("manufacturer", &lib.manufacturer)?;
        validate::non_empty("model", &lib.model)?;
        validate::non_empty_if_set("library_type", lib.library_type.as_deref())?;
        validate::non_empty_if_set("gui_url", lib.gui_url.as_deref())?;
        validate::non_empty_if_set("webcam_url", lib.webcam_url.as_deref())?;
        validate::non_empty_if_set("location", lib.location.as_deref())?;
        non_zero_slots("nb_physical_cartridge_slots", lib.nb_physical_cartridge_slots)?;
        non_zero_slots("nb_physical_drive_slots", lib.nb_physical_drive_slots)?;
        let comment = lib
            .comment
            .as_deref()
            .map(|c| validate::comment("comment", c))
            .transpose()?;

        let mut tx = self.pool.begin().await?;
        if common::exists(&mut *tx, PHYSICAL_LIBRARY, &lib.name).await? {
            return Err(CatalogueError::already_exists(PHYSICAL_LIBRARY.kind, &lib.name));
        }
        let now = common::now();
        sqlx::query(
            "INSERT INTO physical_library (physical_library_name, physical_library_manufacturer, \
             physical_library_model, physical_library_type, gui_url, webcam_url, physical_location, \
             nb_physical_cartridge_slots, nb_available_cartridge_slots, nb_physical_drive_slots, \
             user_comment, creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&lib.name)
        .bind(&lib.manufacturer)
        .bind(&lib.model)
        .bind(&lib.library_type)
        .bind(&lib.gui_url)
        .bind(&lib.webcam_url)
        .bind(&lib.location)
        .bind(lib.nb_physical_cartridge_slots)
        .bind(lib.nb_available_cartridge_slots)
        .bind(lib.nb_physical_drive_slots)
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
        Ok(())
    }

    async fn get_physical_libraries(&self) -> CatalogueResult<Vec<PhysicalLibraryRow>> {
        let rows = sqlx::query_as::<_, PhysicalLibraryRow>(
            "SELECT physical_library_name AS name, physical_library_manufacturer AS manufacturer, \
             physical_library_model AS model, physical_library_type AS library_type, gui_url, \
             webcam_url, physical_location AS location, nb_physical_cartridge_slots, \
             nb_available_cartridge_slots, nb_physical_drive_slots, user_comment AS comment, \
             creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time \
             FROM physical_library ORDER BY physical_library_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn modify_physical_library(
        &self,
        admin: &SecurityIdentity,
        update: &PhysicalLibraryUpdate,
    ) -> CatalogueResult<()> {
        let name = update.name.as_str();
        validate::non_empty("name", name)?;

        let mut tx = self.pool.begin().await?;
        common::require(&mut *tx, PHYSICAL_LIBRARY, name).await?;

        let mut changed = false;
        let text_fields = [
            ("library_type", "physical_library_type", update.library_type.as_ref()),
            ("gui_url", "gui_url", update.gui_url.as_ref()),
            ("webcam_url", "webcam_url", update.webcam_url.as_ref()),
            ("location", "physical_location", update.location.as_ref()),
            ("comment", "user_comment", update.comment.as_ref()),
        ];
        for (field, column, value) in text_fields {
            changed |= set_text(&mut tx, admin, name, field, column, value).await?;
        }

        let slot_fields = [
            (
                "nb_physical_cartridge_slots",
                update.nb_physical_cartridge_slots,
                true,
            ),
            (
                "nb_available_cartridge_slots",
                update.nb_available_cartridge_slots,
                false,
            ),
            ("nb_physical_drive_slots", update.nb_physical_drive_slots, true),
        ];
        for (column, value, must_be_positive) in slot_fields {
            let Some(slots) = value else { continue };
            if must_be_positive {
                non_zero_slots(column, slots)?;
            }
            common::update_column(&mut *tx, PHYSICAL_LIBRARY, name, column, slots, admin).await?;
            changed = true;
        }

        if !changed {
            return Err(CatalogueError::invalid("update", "no field to modify"));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_physical_library(&self, name: &str) -> CatalogueResult<()> {
        let mut tx = self.pool.begin().await?;
        let id = common::require_id(&mut *tx, PHYSICAL_LIBRARY, name).await?;
        rules::ensure_physical_library_deletable(&mut tx, name, id).await?;
        common::delete_row(&mut *tx, PHYSICAL_LIBRARY, name).await?;
        tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// Logical libraries
// =============================================================================

pub struct SqliteLogicalLibraryRepo {
    pool: Pool<Sqlite>,
}

impl SqliteLogicalLibraryRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

async fn physical_library_id(
    conn: &mut SqliteConnection,
    name: Option<&str>,
) -> CatalogueResult<Option<i64>> {
    match name {
        Some(name) => {
            validate::non_empty("physical_library_name", name)?;
            Ok(Some(common::require_id(&mut *conn, PHYSICAL_LIBRARY, name).await?))
        }
        None => Ok(None),
    }
}

#[async_trait]
impl LogicalLibraryRepo for SqliteLogicalLibraryRepo {
    async fn create_logical_library(
        &self,
        admin: &SecurityIdentity,
        lib: &NewLogicalLibrary,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", &lib.name)?;
        let comment = validate::comment("comment", &lib.comment)?;

        let mut tx = self.pool.begin().await?;
        if common::exists(&mut *tx, LOGICAL_LIBRARY, &lib.name).await? {
            return Err(CatalogueError::already_exists(LOGICAL_LIBRARY.kind, &lib.name));
        }
        let physical_id = physical_library_id(&mut tx, lib.physical_library_name.as_deref()).await?;
        let now = common::now();
        sqlx::query(
            "INSERT INTO logical_library (logical_library_name, is_disabled, disabled_reason, \
             physical_library_id, user_comment, \
             creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time) \
             VALUES (?, ?, NULL, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&lib.name)
        .bind(lib.is_disabled)
        .bind(physical_id)
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
        Ok(())
    }

    async fn get_logical_libraries(&self) -> CatalogueResult<Vec<LogicalLibraryRow>> {
        let rows = sqlx::query_as::<_, LogicalLibraryRow>(
            "SELECT ll.logical_library_name AS name, ll.is_disabled, ll.disabled_reason, \
             pl.physical_library_name, ll.user_comment AS comment, \
             ll.creation_log_user_name, ll.creation_log_host_name, ll.creation_log_time, \
             ll.last_update_user_name, ll.last_update_host_name, ll.last_update_time \
             FROM logical_library ll \
             LEFT JOIN physical_library pl ON pl.physical_library_id = ll.physical_library_id \
             ORDER BY ll.logical_library_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn modify_logical_library_name(
        &self,
        admin: &SecurityIdentity,
        current_name: &str,
        new_name: &str,
    ) -> CatalogueResult<()> {
        let mut tx = self.pool.begin().await?;
        common::rename(&mut tx, LOGICAL_LIBRARY, current_name, new_name, admin).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn modify_logical_library_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let comment = validate::comment("comment", comment)?;
        common::update_column(&self.pool, LOGICAL_LIBRARY, name, "user_comment", comment, admin).await
    }

    async fn modify_logical_library_disabled_reason(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        reason: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let reason = validate::comment("disabled_reason", reason)?;
        common::update_column(&self.pool, LOGICAL_LIBRARY, name, "disabled_reason", reason, admin)
            .await
    }

    async fn modify_logical_library_physical_library(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        physical_library_name: Option<&str>,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let mut tx = self.pool.begin().await?;
        let physical_id = physical_library_id(&mut tx, physical_library_name).await?;
        common::update_column(&mut *tx, LOGICAL_LIBRARY, name, "physical_library_id", physical_id, admin)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn set_logical_library_disabled(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        disabled: bool,
        reason: Option<&str>,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        validate::non_empty_if_set("disabled_reason", reason)?;
        let reason = if disabled {
            reason.map(|r| validate::truncate("disabled_reason", r))
        } else {
            None
        };

        let result = sqlx::query(
            "UPDATE logical_library SET is_disabled = ?, disabled_reason = ?, \
             last_update_user_name = ?, last_update_host_name = ?, last_update_time = ? \
             WHERE logical_library_name = ?",
        )
        .bind(disabled)
        .bind(reason)
        .bind(&admin.username)
        .bind(&admin.host)
        .bind(common::now())
        .bind(name)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogueError::not_found(LOGICAL_LIBRARY.kind, name));
        }
        Ok(())
    }

    async fn delete_logical_library(&self, name: &str) -> CatalogueResult<()> {
        let mut tx = self.pool.begin().await?;
        let id = common::require_id(&mut *tx, LOGICAL_LIBRARY, name).await?;
        rules::ensure_logical_library_deletable(&mut tx, name, id).await?;
        common::delete_row(&mut *tx, LOGICAL_LIBRARY, name).await?;
        tx.commit().await?;
        Ok(())
    }
}
