//! Archive files, their tape copies and the file recycle log.

use super::CataloguePools;
use super::common::{self, DISK_INSTANCE, STORAGE_CLASS, TAPE};
use super::cursor::{PageQuery, PagedCursor};
use crate::cursor::BoxCursor;
use crate::error::{CatalogueError, CatalogueResult};
use crate::models::{
    ArchiveFileRow, ArchiveFileSearchCriteria, FileRecycleLogRow, RecycleLogSearchCriteria,
    TapeFileRow, TapeFileWritten,
};
use crate::repos::{ArchiveFileRepo, FileRecycleLogRepo};
use crate::validate;
use async_trait::async_trait;
use sqlx::sqlite::SqliteConnection;
use sqlx::{QueryBuilder, Sqlite};
use std::collections::HashMap;

const ARCHIVE_FILE: &str = "archive file";

const SELECT_ARCHIVE_FILE: &str = "SELECT af.archive_file_id, af.disk_instance_name, \
    af.disk_file_id, af.disk_file_owner_uid, af.disk_file_gid, af.size_in_bytes, \
    af.checksum_adler32, sc.storage_class_name, af.creation_time, af.reconciliation_time \
    FROM archive_file af \
    JOIN storage_class sc ON sc.storage_class_id = af.storage_class_id";

const SELECT_TAPE_FILE: &str = "SELECT archive_file_id, vid, fseq, block_id, \
    logical_size_in_bytes, copy_nb, creation_time FROM tape_file";

const SELECT_RECYCLE_LOG: &str = "SELECT frl.file_recycle_log_id, frl.vid, frl.fseq, \
    frl.block_id, frl.copy_nb, frl.archive_file_id, frl.disk_instance_name, frl.disk_file_id, \
    frl.size_in_bytes, frl.checksum_adler32, sc.storage_class_name, \
    frl.archive_file_creation_time, frl.reason_log, frl.recycle_log_time \
    FROM file_recycle_log frl \
    JOIN storage_class sc ON sc.storage_class_id = frl.storage_class_id";

/// Attach the tape copies of every file in `files`, ordered by copy number.
async fn attach_tape_files(
    conn: &mut SqliteConnection,
    files: &mut [ArchiveFileRow],
) -> CatalogueResult<()> {
    if files.is_empty() {
        return Ok(());
    }
    let mut query = QueryBuilder::<Sqlite>::new(SELECT_TAPE_FILE);
    query.push(" WHERE archive_file_id IN (");
    let mut ids = query.separated(", ");
    for file in files.iter() {
        ids.push_bind(validate::to_db("archive_file_id", file.archive_file_id)?);
    }
    ids.push_unseparated(") ORDER BY archive_file_id, copy_nb");

    let tape_files: Vec<TapeFileRow> = query.build_query_as().fetch_all(&mut *conn).await?;
    let mut by_file: HashMap<u64, Vec<TapeFileRow>> = HashMap::new();
    for tape_file in tape_files {
        by_file
            .entry(tape_file.archive_file_id)
            .or_default()
            .push(tape_file);
    }
    for file in files.iter_mut() {
        file.tape_files = by_file.remove(&file.archive_file_id).unwrap_or_default();
    }
    Ok(())
}

// =============================================================================
// Archive files
// =============================================================================

/// Page query behind the archive file cursor.
struct ArchiveFilePages {
    archive_file_id: Option<i64>,
    disk_instance: Option<String>,
    vid: Option<String>,
    storage_class: Option<String>,
}

#[async_trait]
impl PageQuery for ArchiveFilePages {
    type Item = ArchiveFileRow;

    async fn fetch_page(
        &self,
        conn: &mut SqliteConnection,
        after: i64,
        limit: u32,
    ) -> CatalogueResult<Vec<ArchiveFileRow>> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_ARCHIVE_FILE);
        query.push(" WHERE af.archive_file_id > ").push_bind(after);
        if let Some(id) = self.archive_file_id {
            query.push(" AND af.archive_file_id = ").push_bind(id);
        }
        if let Some(disk_instance) = &self.disk_instance {
            query
                .push(" AND af.disk_instance_name = ")
                .push_bind(disk_instance.clone());
        }
        if let Some(storage_class) = &self.storage_class {
            query
                .push(" AND sc.storage_class_name = ")
                .push_bind(storage_class.clone());
        }
        if let Some(vid) = &self.vid {
            query
                .push(
                    " AND EXISTS (SELECT 1 FROM tape_file tf \
                     WHERE tf.archive_file_id = af.archive_file_id AND tf.vid = ",
                )
                .push_bind(vid.clone())
                .push(")");
        }
        query
            .push(" ORDER BY af.archive_file_id LIMIT ")
            .push_bind(i64::from(limit));

        let mut files: Vec<ArchiveFileRow> =
            query.build_query_as().fetch_all(&mut *conn).await?;
        attach_tape_files(conn, &mut files).await?;
        Ok(files)
    }

    fn key(item: &ArchiveFileRow) -> i64 {
        i64::try_from(item.archive_file_id).unwrap_or(i64::MAX)
    }
}

pub struct SqliteArchiveFileRepo {
    pools: CataloguePools,
}

impl SqliteArchiveFileRepo {
    pub fn new(pools: CataloguePools) -> Self {
        Self { pools }
    }
}

#[async_trait]
impl ArchiveFileRepo for SqliteArchiveFileRepo {
    async fn file_written_to_tape(&self, event: &TapeFileWritten) -> CatalogueResult<()> {
        validate::non_zero("archive_file_id", event.archive_file_id)?;
        validate::non_empty("disk_instance_name", &event.disk_instance_name)?;
        validate::non_empty("disk_file_id", &event.disk_file_id)?;
        validate::non_empty("checksum_adler32", &event.checksum_adler32)?;
        validate::non_empty("storage_class_name", &event.storage_class_name)?;
        validate::non_empty("vid", &event.vid)?;
        validate::non_zero("fseq", event.fseq)?;
        validate::non_zero("copy_nb", u64::from(event.copy_nb))?;
        let archive_file_id = validate::to_db("archive_file_id", event.archive_file_id)?;
        let fseq = validate::to_db("fseq", event.fseq)?;
        let block_id = validate::to_db("block_id", event.block_id)?;
        let size = validate::to_db("size_in_bytes", event.size_in_bytes)?;

        let mut tx = self.pools.metadata.begin().await?;

        let last_fseq: Option<i64> = sqlx::query_scalar("SELECT last_fseq FROM tape WHERE vid = ?")
            .bind(&event.vid)
            .fetch_optional(&mut *tx)
            .await?;
        let last_fseq = last_fseq.ok_or_else(|| CatalogueError::not_found(TAPE.kind, &event.vid))?;
        if fseq != last_fseq + 1 {
            return Err(CatalogueError::Conflict(format!(
                "file {} written to tape {} at fseq {fseq} but the last fseq is {last_fseq}",
                event.archive_file_id, event.vid
            )));
        }

        let existing: Option<(i64, String)> = sqlx::query_as(
            "SELECT size_in_bytes, checksum_adler32 FROM archive_file WHERE archive_file_id = ?",
        )
        .bind(archive_file_id)
        .fetch_optional(&mut *tx)
        .await?;
        let now = common::now();
        match existing {
            Some((known_size, known_checksum)) => {
                if known_size != size || known_checksum != event.checksum_adler32 {
                    return Err(CatalogueError::Conflict(format!(
                        "copy {} of archive file {} does not match the recorded size or checksum",
                        event.copy_nb, event.archive_file_id
                    )));
                }
            }
            None => {
                common::require(&mut *tx, DISK_INSTANCE, &event.disk_instance_name).await?;
                let storage_class_id =
                    common::require_id(&mut *tx, STORAGE_CLASS, &event.storage_class_name).await?;
                sqlx::query(
                    "INSERT INTO archive_file (archive_file_id, disk_instance_name, disk_file_id, \
                     disk_file_owner_uid, disk_file_gid, size_in_bytes, checksum_adler32, \
                     storage_class_id, creation_time, reconciliation_time) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(archive_file_id)
                .bind(&event.disk_instance_name)
                .bind(&event.disk_file_id)
                .bind(event.disk_file_owner_uid)
                .bind(event.disk_file_gid)
                .bind(size)
                .bind(&event.checksum_adler32)
                .bind(storage_class_id)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }
        }

        let copy_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM tape_file WHERE archive_file_id = ? AND copy_nb = ?)",
        )
        .bind(archive_file_id)
        .bind(event.copy_nb)
        .fetch_one(&mut *tx)
        .await?;
        if copy_exists {
            return Err(CatalogueError::already_exists(
                "tape file",
                format!("{}:{}", event.archive_file_id, event.copy_nb),
            ));
        }

        sqlx::query(
            "INSERT INTO tape_file (vid, fseq, block_id, logical_size_in_bytes, copy_nb, \
             creation_time, archive_file_id) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.vid)
        .bind(fseq)
        .bind(block_id)
        .bind(size)
        .bind(event.copy_nb)
        .bind(now)
        .bind(archive_file_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE tape SET last_fseq = ?, data_in_bytes = data_in_bytes + ?, \
             master_data_in_bytes = master_data_in_bytes + ?, \
             nb_master_files = nb_master_files + 1, dirty = 1, last_write_time = ? \
             WHERE vid = ?",
        )
        .bind(fseq)
        .bind(size)
        .bind(size)
        .bind(now)
        .bind(&event.vid)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            archive_file_id = event.archive_file_id,
            vid = %event.vid,
            fseq = event.fseq,
            copy_nb = event.copy_nb,
            "File written to tape"
        );
        Ok(())
    }

    async fn get_archive_file(
        &self,
        archive_file_id: u64,
    ) -> CatalogueResult<Option<ArchiveFileRow>> {
        let id = validate::to_db("archive_file_id", archive_file_id)?;
        let mut conn = self.pools.metadata.acquire().await?;
        let sql = format!("{SELECT_ARCHIVE_FILE} WHERE af.archive_file_id = ?");
        let file = sqlx::query_as::<_, ArchiveFileRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        let Some(file) = file else {
            return Ok(None);
        };
        let mut files = [file];
        attach_tape_files(&mut conn, &mut files).await?;
        let [file] = files;
        Ok(Some(file))
    }

    async fn get_archive_files(
        &self,
        criteria: &ArchiveFileSearchCriteria,
    ) -> CatalogueResult<BoxCursor<ArchiveFileRow>> {
        validate::non_empty_if_set("disk_instance", criteria.disk_instance.as_deref())?;
        validate::non_empty_if_set("vid", criteria.vid.as_deref())?;
        validate::non_empty_if_set("storage_class", criteria.storage_class.as_deref())?;
        let archive_file_id = criteria
            .archive_file_id
            .map(|id| validate::to_db("archive_file_id", id))
            .transpose()?;

        let metadata = &self.pools.metadata;
        if let Some(disk_instance) = &criteria.disk_instance {
            common::require(metadata, DISK_INSTANCE, disk_instance).await?;
        }
        if let Some(vid) = &criteria.vid {
            common::require(metadata, TAPE, vid).await?;
        }
        if let Some(storage_class) = &criteria.storage_class {
            common::require(metadata, STORAGE_CLASS, storage_class).await?;
        }

        let query = ArchiveFilePages {
            archive_file_id,
            disk_instance: criteria.disk_instance.clone(),
            vid: criteria.vid.clone(),
            storage_class: criteria.storage_class.clone(),
        };
        Ok(Box::new(PagedCursor::new(
            self.pools.listing.clone(),
            query,
            self.pools.listing_page_size,
        )))
    }

    async fn delete_archive_file(
        &self,
        disk_instance_name: &str,
        archive_file_id: u64,
        reason: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("disk_instance_name", disk_instance_name)?;
        let reason = validate::comment("reason", reason)?;
        let id = validate::to_db("archive_file_id", archive_file_id)?;

        let mut tx = self.pools.metadata.begin().await?;
        let owner: Option<String> = sqlx::query_scalar(
            "SELECT disk_instance_name FROM archive_file WHERE archive_file_id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let owner =
            owner.ok_or_else(|| CatalogueError::not_found(ARCHIVE_FILE, archive_file_id.to_string()))?;
        if owner != disk_instance_name {
            return Err(CatalogueError::Conflict(format!(
                "archive file {archive_file_id} belongs to disk instance '{owner}', \
                 not '{disk_instance_name}'"
            )));
        }

        let recycled = sqlx::query(
            "INSERT INTO file_recycle_log (vid, fseq, block_id, copy_nb, archive_file_id, \
             disk_instance_name, disk_file_id, size_in_bytes, checksum_adler32, storage_class_id, \
             archive_file_creation_time, reason_log, recycle_log_time) \
             SELECT tf.vid, tf.fseq, tf.block_id, tf.copy_nb, af.archive_file_id, \
             af.disk_instance_name, af.disk_file_id, af.size_in_bytes, af.checksum_adler32, \
             af.storage_class_id, af.creation_time, ?, ? \
             FROM tape_file tf JOIN archive_file af ON af.archive_file_id = tf.archive_file_id \
             WHERE af.archive_file_id = ?",
        )
        .bind(&reason)
        .bind(common::now())
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query("DELETE FROM tape_file WHERE archive_file_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM archive_file WHERE archive_file_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(
            archive_file_id,
            disk_instance = %disk_instance_name,
            copies = recycled,
            "Archive file deleted"
        );
        Ok(())
    }
}

// =============================================================================
// File recycle log
// =============================================================================

/// Page query behind the recycle log cursor.
struct RecycleLogPages {
    vid: Option<String>,
    archive_file_id: Option<i64>,
    disk_instance: Option<String>,
}

#[async_trait]
impl PageQuery for RecycleLogPages {
    type Item = FileRecycleLogRow;

    async fn fetch_page(
        &self,
        conn: &mut SqliteConnection,
        after: i64,
        limit: u32,
    ) -> CatalogueResult<Vec<FileRecycleLogRow>> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_RECYCLE_LOG);
        query.push(" WHERE frl.file_recycle_log_id > ").push_bind(after);
        if let Some(vid) = &self.vid {
            query.push(" AND frl.vid = ").push_bind(vid.clone());
        }
        if let Some(id) = self.archive_file_id {
            query.push(" AND frl.archive_file_id = ").push_bind(id);
        }
        if let Some(disk_instance) = &self.disk_instance {
            query
                .push(" AND frl.disk_instance_name = ")
                .push_bind(disk_instance.clone());
        }
        query
            .push(" ORDER BY frl.file_recycle_log_id LIMIT ")
            .push_bind(i64::from(limit));

        let rows = query.build_query_as().fetch_all(&mut *conn).await?;
        Ok(rows)
    }

    fn key(item: &FileRecycleLogRow) -> i64 {
        i64::try_from(item.file_recycle_log_id).unwrap_or(i64::MAX)
    }
}

pub struct SqliteFileRecycleLogRepo {
    pools: CataloguePools,
}

impl SqliteFileRecycleLogRepo {
    pub fn new(pools: CataloguePools) -> Self {
        Self { pools }
    }
}

#[async_trait]
impl FileRecycleLogRepo for SqliteFileRecycleLogRepo {
    async fn get_file_recycle_logs(
        &self,
        criteria: &RecycleLogSearchCriteria,
    ) -> CatalogueResult<BoxCursor<FileRecycleLogRow>> {
        validate::non_empty_if_set("vid", criteria.vid.as_deref())?;
        validate::non_empty_if_set("disk_instance", criteria.disk_instance.as_deref())?;
        let archive_file_id = criteria
            .archive_file_id
            .map(|id| validate::to_db("archive_file_id", id))
            .transpose()?;

        let query = RecycleLogPages {
            vid: criteria.vid.clone(),
            archive_file_id,
            disk_instance: criteria.disk_instance.clone(),
        };
        Ok(Box::new(PagedCursor::new(
            self.pools.listing.clone(),
            query,
            self.pools.listing_page_size,
        )))
    }

    async fn delete_files_from_recycle_log(&self, vid: &str) -> CatalogueResult<u64> {
        validate::non_empty("vid", vid)?;
        let result = sqlx::query("DELETE FROM file_recycle_log WHERE vid = ?")
            .bind(vid)
            .execute(&self.pools.metadata)
            .await?;
        let deleted = result.rows_affected();
        tracing::info!(vid = %vid, deleted, "Recycled files forgotten");
        Ok(deleted)
    }
}
