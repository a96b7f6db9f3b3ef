//! Disk systems.

use super::common::{self, DISK_SYSTEM};
use crate::error::{CatalogueError, CatalogueResult};
use crate::models::{DiskSystemList, DiskSystemRow, NewDiskSystem};
use crate::repos::DiskSystemRepo;
use crate::validate;
use async_trait::async_trait;
use sqlx::sqlite::SqliteConnection;
use sqlx::{Pool, Sqlite};
use tapecat_core::SecurityIdentity;

const SELECT_DISK_SYSTEM: &str = "SELECT ds.disk_system_name AS name, ds.file_regexp, \
    ds.disk_instance_name, ds.disk_instance_space_name, dis.free_space_query_url, \
    dis.refresh_interval, dis.free_space, dis.last_refresh_time, \
    ds.targeted_free_space, ds.sleep_time, ds.user_comment AS comment, \
    ds.creation_log_user_name, ds.creation_log_host_name, ds.creation_log_time, \
    ds.last_update_user_name, ds.last_update_host_name, ds.last_update_time \
    FROM disk_system ds \
    JOIN disk_instance_space dis ON dis.disk_instance_name = ds.disk_instance_name \
     AND dis.disk_instance_space_name = ds.disk_instance_space_name";

pub struct SqliteDiskSystemRepo {
    pool: Pool<Sqlite>,
}

impl SqliteDiskSystemRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

async fn require_space(
    conn: &mut SqliteConnection,
    disk_instance_name: &str,
    space_name: &str,
) -> CatalogueResult<()> {
    let found: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM disk_instance_space \
         WHERE disk_instance_name = ? AND disk_instance_space_name = ?)",
    )
    .bind(disk_instance_name)
    .bind(space_name)
    .fetch_one(&mut *conn)
    .await?;
    if !found {
        return Err(CatalogueError::not_found(
            "disk instance space",
            format!("{disk_instance_name}:{space_name}"),
        ));
    }
    Ok(())
}

#[async_trait]
impl DiskSystemRepo for SqliteDiskSystemRepo {
    async fn create_disk_system(
        &self,
        admin: &SecurityIdentity,
        ds: &NewDiskSystem,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", &ds.name)?;
        validate::regex("file_regexp", &ds.file_regexp)?;
        validate::non_empty("disk_instance_name", &ds.disk_instance_name)?;
        validate::non_empty("disk_instance_space_name", &ds.disk_instance_space_name)?;
        validate::non_zero("targeted_free_space", ds.targeted_free_space)?;
        validate::non_zero("sleep_time", ds.sleep_time)?;
        let targeted_free_space = validate::to_db("targeted_free_space", ds.targeted_free_space)?;
        let sleep_time = validate::to_db("sleep_time", ds.sleep_time)?;
        let comment = validate::comment("comment", &ds.comment)?;

        let mut tx = self.pool.begin().await?;
        if common::exists(&mut *tx, DISK_SYSTEM, &ds.name).await? {
            return Err(CatalogueError::already_exists(DISK_SYSTEM.kind, &ds.name));
        }
        require_space(&mut tx, &ds.disk_instance_name, &ds.disk_instance_space_name).await?;

        let now = common::now();
        sqlx::query(
            "INSERT INTO disk_system (disk_system_name, file_regexp, disk_instance_name, \
             disk_instance_space_name, targeted_free_space, sleep_time, user_comment, \
             creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&ds.name)
        .bind(&ds.file_regexp)
        .bind(&ds.disk_instance_name)
        .bind(&ds.disk_instance_space_name)
        .bind(targeted_free_space)
        .bind(sleep_time)
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

        tracing::info!(disk_system = %ds.name, created_by = %admin, "Disk system created");
        Ok(())
    }

    async fn get_all_disk_systems(&self) -> CatalogueResult<DiskSystemList> {
        let sql = format!("{SELECT_DISK_SYSTEM} ORDER BY ds.disk_system_name");
        let rows = sqlx::query_as::<_, DiskSystemRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        DiskSystemList::from_rows(rows)
    }

    async fn get_disk_system(&self, name: &str) -> CatalogueResult<Option<DiskSystemRow>> {
        let sql = format!("{SELECT_DISK_SYSTEM} WHERE ds.disk_system_name = ?");
        let row = sqlx::query_as::<_, DiskSystemRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn disk_system_exists(&self, name: &str) -> CatalogueResult<bool> {
        common::exists(&self.pool, DISK_SYSTEM, name).await
    }

    async fn modify_disk_system_file_regexp(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        file_regexp: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        validate::regex("file_regexp", file_regexp)?;
        common::update_column(
            &self.pool,
            DISK_SYSTEM,
            name,
            "file_regexp",
            file_regexp.to_string(),
            admin,
        )
        .await
    }

    async fn modify_disk_system_targeted_free_space(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        targeted_free_space: u64,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        validate::non_zero("targeted_free_space", targeted_free_space)?;
        let value = validate::to_db("targeted_free_space", targeted_free_space)?;
        common::update_column(&self.pool, DISK_SYSTEM, name, "targeted_free_space", value, admin)
            .await
    }

    async fn modify_disk_system_sleep_time(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        sleep_time: u64,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        validate::non_zero("sleep_time", sleep_time)?;
        let value = validate::to_db("sleep_time", sleep_time)?;
        common::update_column(&self.pool, DISK_SYSTEM, name, "sleep_time", value, admin).await
    }

    async fn modify_disk_system_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let comment = validate::comment("comment", comment)?;
        common::update_column(&self.pool, DISK_SYSTEM, name, "user_comment", comment, admin).await
    }

    async fn modify_disk_system_disk_instance_space(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        disk_instance_name: &str,
        disk_instance_space_name: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        validate::non_empty("disk_instance_name", disk_instance_name)?;
        validate::non_empty("disk_instance_space_name", disk_instance_space_name)?;

        let mut tx = self.pool.begin().await?;
        common::require(&mut *tx, DISK_SYSTEM, name).await?;
        require_space(&mut tx, disk_instance_name, disk_instance_space_name).await?;
        sqlx::query(
            "UPDATE disk_system SET disk_instance_name = ?, disk_instance_space_name = ?, \
             last_update_user_name = ?, last_update_host_name = ?, last_update_time = ? \
             WHERE disk_system_name = ?",
        )
        .bind(disk_instance_name)
        .bind(disk_instance_space_name)
        .bind(&admin.username)
        .bind(&admin.host)
        .bind(common::now())
        .bind(name)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_disk_system(&self, name: &str) -> CatalogueResult<()> {
        common::delete_row(&self.pool, DISK_SYSTEM, name).await
    }
}
