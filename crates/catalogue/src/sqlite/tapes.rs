//! Tapes and their lifecycle events.

use super::common::{self, LOGICAL_LIBRARY, MEDIA_TYPE, TAPE, TAPE_POOL, VIRTUAL_ORGANIZATION};
use super::rules;
use crate::error::{CatalogueError, CatalogueResult};
use crate::models::{NewTape, TapeRow, TapeSearchCriteria};
use crate::repos::TapeRepo;
use crate::validate;
use async_trait::async_trait;
use sqlx::sqlite::SqliteConnection;
use sqlx::{Pool, QueryBuilder, Sqlite};
use tapecat_core::{SecurityIdentity, TapeState};

const SELECT_TAPE: &str = "SELECT t.vid, mt.media_type_name AS media_type, t.vendor, \
    ll.logical_library_name AS logical_library, tp.tape_pool_name AS tape_pool, \
    vo.virtual_organization_name AS vo, t.encryption_key_name, t.capacity_in_bytes, \
    t.data_in_bytes, t.last_fseq, t.nb_master_files, t.master_data_in_bytes, \
    t.is_full AS full, t.is_read_only AS read_only, t.dirty, t.tape_state AS state, \
    t.state_reason, t.state_update_time, t.state_modified_by, t.verification_status, \
    t.purchase_order, t.label_drive, t.label_time, t.last_read_drive, t.last_read_time, \
    t.last_write_drive, t.last_write_time, t.read_mount_count, t.write_mount_count, \
    t.user_comment AS comment, \
    t.creation_log_user_name, t.creation_log_host_name, t.creation_log_time, \
    t.last_update_user_name, t.last_update_host_name, t.last_update_time \
    FROM tape t \
    JOIN media_type mt ON mt.media_type_id = t.media_type_id \
    JOIN logical_library ll ON ll.logical_library_id = t.logical_library_id \
    JOIN tape_pool tp ON tp.tape_pool_id = t.tape_pool_id \
    JOIN virtual_organization vo ON vo.virtual_organization_id = tp.virtual_organization_id";

pub struct SqliteTapeRepo {
    pool: Pool<Sqlite>,
}

impl SqliteTapeRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run a system (non-admin) update on one tape, failing when the tape is absent.
    async fn system_update(&self, sql: &str, vid: &str, drive: Option<&str>) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        let mut query = sqlx::query(sql);
        if let Some(drive) = drive {
            validate::non_empty("drive_name", drive)?;
            query = query.bind(drive).bind(common::now());
        }
        let result = query.bind(vid).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(CatalogueError::not_found(TAPE.kind, vid));
        }
        Ok(())
    }
}

/// Resolve a media type to its id and nominal capacity.
async fn media_type_capacity(
    conn: &mut SqliteConnection,
    media_type: &str,
) -> CatalogueResult<(i64, i64)> {
    let row: Option<(i64, i64)> = sqlx::query_as(
        "SELECT media_type_id, capacity_in_bytes FROM media_type WHERE media_type_name = ?",
    )
    .bind(media_type)
    .fetch_optional(&mut *conn)
    .await?;
    row.ok_or_else(|| CatalogueError::not_found(MEDIA_TYPE.kind, media_type))
}

async fn current_state(conn: &mut SqliteConnection, vid: &str) -> CatalogueResult<TapeState> {
    let state: Option<String> = sqlx::query_scalar("SELECT tape_state FROM tape WHERE vid = ?")
        .bind(vid)
        .fetch_optional(&mut *conn)
        .await?;
    let state = state.ok_or_else(|| CatalogueError::not_found(TAPE.kind, vid))?;
    state
        .parse()
        .map_err(|e: tapecat_core::Error| CatalogueError::Internal(e.to_string()))
}

/// A reason is mandatory for every state but ACTIVE.
fn state_reason(state: TapeState, reason: Option<&str>) -> CatalogueResult<Option<String>> {
    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    if state.requires_reason() && reason.is_none() {
        return Err(CatalogueError::empty("state_reason"));
    }
    Ok(reason.map(|r| validate::truncate("state_reason", r)))
}

fn optional_text(field: &'static str, value: Option<&str>) -> CatalogueResult<Option<String>> {
    validate::non_empty_if_set(field, value)?;
    Ok(value.map(|v| validate::truncate(field, v)))
}

#[async_trait]
impl TapeRepo for SqliteTapeRepo {
    async fn create_tape(&self, admin: &SecurityIdentity, tape: &NewTape) -> CatalogueResult<()> {
        validate::non_empty("vid", &tape.vid)?;
        if tape.vid != tape.vid.to_uppercase() {
            return Err(CatalogueError::invalid("vid", "must be upper case"));
        }
        validate::non_empty("media_type", &tape.media_type)?;
        validate::non_empty("vendor", &tape.vendor)?;
        validate::non_empty("logical_library", &tape.logical_library)?;
        validate::non_empty("tape_pool", &tape.tape_pool)?;
        let reason = state_reason(tape.state, tape.state_reason.as_deref())?;
        let purchase_order = optional_text("purchase_order", tape.purchase_order.as_deref())?;
        let comment = optional_text("comment", tape.comment.as_deref())?;

        let mut tx = self.pool.begin().await?;
        if common::exists(&mut *tx, TAPE, &tape.vid).await? {
            return Err(CatalogueError::already_exists(TAPE.kind, &tape.vid));
        }
        let (media_type_id, capacity) = media_type_capacity(&mut tx, &tape.media_type).await?;
        let library_id = common::require_id(&mut *tx, LOGICAL_LIBRARY, &tape.logical_library).await?;
        let pool_id = common::require_id(&mut *tx, TAPE_POOL, &tape.tape_pool).await?;

        let now = common::now();
        sqlx::query(
            "INSERT INTO tape (vid, media_type_id, vendor, logical_library_id, tape_pool_id, \
             capacity_in_bytes, is_full, tape_state, state_reason, state_update_time, \
             state_modified_by, purchase_order, user_comment, \
             creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&tape.vid)
        .bind(media_type_id)
        .bind(&tape.vendor)
        .bind(library_id)
        .bind(pool_id)
        .bind(capacity)
        .bind(tape.full)
        .bind(tape.state.as_str())
        .bind(reason)
        .bind(now)
        .bind(admin.to_string())
        .bind(purchase_order)
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

        tracing::info!(
            vid = %tape.vid,
            tape_pool = %tape.tape_pool,
            media_type = %tape.media_type,
            capacity_in_bytes = capacity,
            created_by = %admin,
            "Tape created"
        );
        Ok(())
    }

    async fn get_tapes(&self, criteria: &TapeSearchCriteria) -> CatalogueResult<Vec<TapeRow>> {
        let text = [
            ("vid", criteria.vid.as_deref()),
            ("media_type", criteria.media_type.as_deref()),
            ("vendor", criteria.vendor.as_deref()),
            ("logical_library", criteria.logical_library.as_deref()),
            ("tape_pool", criteria.tape_pool.as_deref()),
            ("vo", criteria.vo.as_deref()),
            ("purchase_order", criteria.purchase_order.as_deref()),
        ];
        for (field, value) in text {
            validate::non_empty_if_set(field, value)?;
        }
        let references = [
            (MEDIA_TYPE, criteria.media_type.as_deref()),
            (LOGICAL_LIBRARY, criteria.logical_library.as_deref()),
            (TAPE_POOL, criteria.tape_pool.as_deref()),
            (VIRTUAL_ORGANIZATION, criteria.vo.as_deref()),
        ];
        for (entity, value) in references {
            if let Some(name) = value {
                common::require(&self.pool, entity, name).await?;
            }
        }

        let mut query = QueryBuilder::<Sqlite>::new(SELECT_TAPE);
        let mut sep = " WHERE ";
        let columns = [
            ("t.vid = ", &criteria.vid),
            ("mt.media_type_name = ", &criteria.media_type),
            ("t.vendor = ", &criteria.vendor),
            ("ll.logical_library_name = ", &criteria.logical_library),
            ("tp.tape_pool_name = ", &criteria.tape_pool),
            ("vo.virtual_organization_name = ", &criteria.vo),
            ("t.purchase_order = ", &criteria.purchase_order),
        ];
        for (column, value) in columns {
            if let Some(value) = value {
                query.push(sep).push(column).push_bind(value.clone());
                sep = " AND ";
            }
        }
        if let Some(full) = criteria.full {
            query.push(sep).push("t.is_full = ").push_bind(full);
            sep = " AND ";
        }
        if let Some(state) = criteria.state {
            query.push(sep).push("t.tape_state = ").push_bind(state.as_str());
        }
        query.push(" ORDER BY t.vid");

        let tapes = query.build_query_as::<TapeRow>().fetch_all(&self.pool).await?;
        Ok(tapes)
    }

    async fn get_tape(&self, vid: &str) -> CatalogueResult<Option<TapeRow>> {
        validate::non_empty("vid", vid)?;
        let sql = format!("{SELECT_TAPE} WHERE t.vid = ?");
        let tape = sqlx::query_as::<_, TapeRow>(&sql)
            .bind(vid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tape)
    }

    async fn get_tapes_by_vids(&self, vids: &[String]) -> CatalogueResult<Vec<TapeRow>> {
        if vids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_TAPE);
        query.push(" WHERE t.vid IN (");
        let mut list = query.separated(", ");
        for vid in vids {
            validate::non_empty("vid", vid)?;
            list.push_bind(vid.clone());
        }
        list.push_unseparated(") ORDER BY t.vid");

        let tapes = query.build_query_as::<TapeRow>().fetch_all(&self.pool).await?;
        if let Some(missing) = vids.iter().find(|vid| !tapes.iter().any(|t| &t.vid == *vid)) {
            return Err(CatalogueError::not_found(TAPE.kind, missing));
        }
        Ok(tapes)
    }

    async fn tape_exists(&self, vid: &str) -> CatalogueResult<bool> {
        common::exists(&self.pool, TAPE, vid).await
    }

    async fn modify_tape_media_type(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        media_type: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        validate::non_empty("media_type", media_type)?;
        let mut tx = self.pool.begin().await?;
        common::require(&mut *tx, TAPE, vid).await?;
        let (media_type_id, capacity) = media_type_capacity(&mut tx, media_type).await?;
        sqlx::query(
            "UPDATE tape SET media_type_id = ?, capacity_in_bytes = ?, \
             last_update_user_name = ?, last_update_host_name = ?, last_update_time = ? \
             WHERE vid = ?",
        )
        .bind(media_type_id)
        .bind(capacity)
        .bind(&admin.username)
        .bind(&admin.host)
        .bind(common::now())
        .bind(vid)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn modify_tape_vendor(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        vendor: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        validate::non_empty("vendor", vendor)?;
        common::update_column(&self.pool, TAPE, vid, "vendor", vendor.to_string(), admin).await
    }

    async fn modify_tape_logical_library_name(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        logical_library: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        validate::non_empty("logical_library", logical_library)?;
        let mut tx = self.pool.begin().await?;
        let library_id = common::require_id(&mut *tx, LOGICAL_LIBRARY, logical_library).await?;
        common::update_column(&mut *tx, TAPE, vid, "logical_library_id", library_id, admin).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn modify_tape_tape_pool_name(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        tape_pool: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        validate::non_empty("tape_pool", tape_pool)?;
        let mut tx = self.pool.begin().await?;
        let pool_id = common::require_id(&mut *tx, TAPE_POOL, tape_pool).await?;
        common::update_column(&mut *tx, TAPE, vid, "tape_pool_id", pool_id, admin).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn modify_tape_encryption_key_name(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        encryption_key_name: Option<&str>,
    ) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        let value = optional_text("encryption_key_name", encryption_key_name)?;
        common::update_column(&self.pool, TAPE, vid, "encryption_key_name", value, admin).await
    }

    async fn modify_tape_purchase_order(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        purchase_order: Option<&str>,
    ) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        let value = optional_text("purchase_order", purchase_order)?;
        common::update_column(&self.pool, TAPE, vid, "purchase_order", value, admin).await
    }

    async fn modify_tape_verification_status(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        verification_status: Option<&str>,
    ) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        let value = optional_text("verification_status", verification_status)?;
        common::update_column(&self.pool, TAPE, vid, "verification_status", value, admin).await
    }

    async fn modify_tape_comment(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        comment: Option<&str>,
    ) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        let value = optional_text("comment", comment)?;
        common::update_column(&self.pool, TAPE, vid, "user_comment", value, admin).await
    }

    async fn modify_tape_state(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        prev_state: Option<TapeState>,
        new_state: TapeState,
        reason: Option<&str>,
    ) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        let reason = state_reason(new_state, reason)?;

        let mut tx = self.pool.begin().await?;
        let current = current_state(&mut tx, vid).await?;
        if let Some(expected) = prev_state.filter(|expected| *expected != current) {
            return Err(CatalogueError::Conflict(format!(
                "cannot change state of tape '{vid}' to {}: it is {}, not {}",
                new_state.as_str(),
                current.as_str(),
                expected.as_str()
            )));
        }

        let now = common::now();
        sqlx::query(
            "UPDATE tape SET tape_state = ?, state_reason = ?, state_update_time = ?, \
             state_modified_by = ?, last_update_user_name = ?, last_update_host_name = ?, \
             last_update_time = ? WHERE vid = ?",
        )
        .bind(new_state.as_str())
        .bind(reason)
        .bind(now)
        .bind(admin.to_string())
        .bind(&admin.username)
        .bind(&admin.host)
        .bind(now)
        .bind(vid)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(
            vid,
            from = current.as_str(),
            to = new_state.as_str(),
            modified_by = %admin,
            "Tape state changed"
        );
        Ok(())
    }

    async fn set_tape_full(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        full: bool,
    ) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        common::update_column(&self.pool, TAPE, vid, "is_full", full, admin).await
    }

    async fn set_tape_read_only(
        &self,
        admin: &SecurityIdentity,
        vid: &str,
        read_only: bool,
    ) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        common::update_column(&self.pool, TAPE, vid, "is_read_only", read_only, admin).await
    }

    async fn set_tape_dirty(&self, vid: &str, dirty: bool) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        let result = sqlx::query("UPDATE tape SET dirty = ? WHERE vid = ?")
            .bind(dirty)
            .bind(vid)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogueError::not_found(TAPE.kind, vid));
        }
        Ok(())
    }

    async fn no_space_left_on_tape(&self, vid: &str) -> CatalogueResult<()> {
        self.system_update("UPDATE tape SET is_full = 1 WHERE vid = ?", vid, None)
            .await?;
        tracing::info!(vid, "Tape marked full after end of medium");
        Ok(())
    }

    async fn tape_labelled(&self, vid: &str, drive_name: &str) -> CatalogueResult<()> {
        self.system_update(
            "UPDATE tape SET label_drive = ?, label_time = ? WHERE vid = ?",
            vid,
            Some(drive_name),
        )
        .await
    }

    async fn tape_mounted_for_archive(&self, vid: &str, drive_name: &str) -> CatalogueResult<()> {
        self.system_update(
            "UPDATE tape SET last_write_drive = ?, last_write_time = ?, \
             write_mount_count = write_mount_count + 1 WHERE vid = ?",
            vid,
            Some(drive_name),
        )
        .await
    }

    async fn tape_mounted_for_retrieve(&self, vid: &str, drive_name: &str) -> CatalogueResult<()> {
        self.system_update(
            "UPDATE tape SET last_read_drive = ?, last_read_time = ?, \
             read_mount_count = read_mount_count + 1 WHERE vid = ?",
            vid,
            Some(drive_name),
        )
        .await
    }

    async fn reclaim_tape(&self, admin: &SecurityIdentity, vid: &str) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        let mut tx = self.pool.begin().await?;
        let full: Option<bool> = sqlx::query_scalar("SELECT is_full FROM tape WHERE vid = ?")
            .bind(vid)
            .fetch_optional(&mut *tx)
            .await?;
        let full = full.ok_or_else(|| CatalogueError::not_found(TAPE.kind, vid))?;
        let state = current_state(&mut tx, vid).await?;
        if !matches!(
            state,
            TapeState::Active | TapeState::Disabled | TapeState::Broken
        ) {
            return Err(CatalogueError::Conflict(format!(
                "cannot reclaim tape '{vid}': it is {}",
                state.as_str()
            )));
        }
        if !full {
            return Err(CatalogueError::Conflict(format!(
                "cannot reclaim tape '{vid}': it is not full"
            )));
        }
        let nb_files: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tape_file WHERE vid = ?")
            .bind(vid)
            .fetch_one(&mut *tx)
            .await?;
        if nb_files > 0 {
            return Err(CatalogueError::not_empty(
                TAPE.kind,
                vid,
                format!("it still holds {nb_files} live tape file(s)"),
            ));
        }

        let recycled = sqlx::query("DELETE FROM file_recycle_log WHERE vid = ?")
            .bind(vid)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query(
            "UPDATE tape SET data_in_bytes = 0, master_data_in_bytes = 0, last_fseq = 0, \
             nb_master_files = 0, is_full = 0, dirty = 0, verification_status = NULL, \
             last_update_user_name = ?, last_update_host_name = ?, last_update_time = ? \
             WHERE vid = ?",
        )
        .bind(&admin.username)
        .bind(&admin.host)
        .bind(common::now())
        .bind(vid)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(vid, recycled, reclaimed_by = %admin, "Tape reclaimed");
        Ok(())
    }

    async fn get_tapes_for_writing(&self, logical_library: &str) -> CatalogueResult<Vec<TapeRow>> {
        validate::non_empty("logical_library", logical_library)?;
        let sql = format!(
            "{SELECT_TAPE} WHERE ll.logical_library_name = ? AND ll.is_disabled = 0 \
             AND t.tape_state = 'ACTIVE' AND t.is_full = 0 AND t.is_read_only = 0 \
             ORDER BY t.data_in_bytes DESC, t.vid"
        );
        let tapes = sqlx::query_as::<_, TapeRow>(&sql)
            .bind(logical_library)
            .fetch_all(&self.pool)
            .await?;
        Ok(tapes)
    }

    async fn delete_tape(&self, vid: &str) -> CatalogueResult<()> {
        validate::non_empty("vid", vid)?;
        let mut tx = self.pool.begin().await?;
        common::require(&mut *tx, TAPE, vid).await?;
        rules::ensure_tape_deletable(&mut tx, vid).await?;
        common::delete_row(&mut *tx, TAPE, vid).await?;
        tx.commit().await?;
        tracing::info!(vid, "Tape deleted");
        Ok(())
    }
}
