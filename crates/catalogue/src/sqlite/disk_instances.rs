//! Disk instances and the named spaces inside them.

use super::common::{self, DISK_INSTANCE};
use super::rules;
use crate::error::{CatalogueError, CatalogueResult};
use crate::models::{DiskInstanceRow, DiskInstanceSpaceRow, NewDiskInstanceSpace};
use crate::repos::{DiskInstanceRepo, DiskInstanceSpaceRepo};
use crate::validate;
use async_trait::async_trait;
use sqlx::sqlite::SqliteConnection;
use sqlx::{Encode, Pool, Sqlite, Type};
use tapecat_core::SecurityIdentity;

const DISK_INSTANCE_SPACE: &str = "disk instance space";

pub struct SqliteDiskInstanceRepo {
    pool: Pool<Sqlite>,
}

impl SqliteDiskInstanceRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiskInstanceRepo for SqliteDiskInstanceRepo {
    async fn create_disk_instance(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let comment = validate::comment("comment", comment)?;

        let mut tx = self.pool.begin().await?;
        if common::exists(&mut *tx, DISK_INSTANCE, name).await? {
            return Err(CatalogueError::already_exists(DISK_INSTANCE.kind, name));
        }
        let now = common::now();
        sqlx::query(
            "INSERT INTO disk_instance (disk_instance_name, user_comment, \
             creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
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

    async fn get_all_disk_instances(&self) -> CatalogueResult<Vec<DiskInstanceRow>> {
        let rows = sqlx::query_as::<_, DiskInstanceRow>(
            "SELECT disk_instance_name AS name, user_comment AS comment, \
             creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time \
             FROM disk_instance ORDER BY disk_instance_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn modify_disk_instance_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let comment = validate::comment("comment", comment)?;
        common::update_column(&self.pool, DISK_INSTANCE, name, "user_comment", comment, admin).await
    }

    async fn delete_disk_instance(&self, name: &str) -> CatalogueResult<()> {
        let mut tx = self.pool.begin().await?;
        common::require(&mut *tx, DISK_INSTANCE, name).await?;
        rules::ensure_disk_instance_deletable(&mut tx, name).await?;
        common::delete_row(&mut *tx, DISK_INSTANCE, name).await?;
        tx.commit().await?;
        Ok(())
    }
}

pub struct SqliteDiskInstanceSpaceRepo {
    pool: Pool<Sqlite>,
}

impl SqliteDiskInstanceSpaceRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn update_space_column<T>(
        &self,
        admin: &SecurityIdentity,
        disk_instance_name: &str,
        name: &str,
        column: &'static str,
        value: T,
    ) -> CatalogueResult<()>
    where
        T: for<'q> Encode<'q, Sqlite> + Type<Sqlite> + Send + 'static,
    {
        let sql = format!(
            "UPDATE disk_instance_space SET {column} = ?, last_update_user_name = ?, \
             last_update_host_name = ?, last_update_time = ? \
             WHERE disk_instance_name = ? AND disk_instance_space_name = ?"
        );
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(&admin.username)
            .bind(&admin.host)
            .bind(common::now())
            .bind(disk_instance_name)
            .bind(name)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(space_not_found(disk_instance_name, name));
        }
        Ok(())
    }
}

fn space_not_found(disk_instance_name: &str, name: &str) -> CatalogueError {
    CatalogueError::not_found(DISK_INSTANCE_SPACE, format!("{disk_instance_name}:{name}"))
}

async fn space_exists(
    conn: &mut SqliteConnection,
    disk_instance_name: &str,
    name: &str,
) -> CatalogueResult<bool> {
    let found: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM disk_instance_space \
         WHERE disk_instance_name = ? AND disk_instance_space_name = ?)",
    )
    .bind(disk_instance_name)
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;
    Ok(found)
}

#[async_trait]
impl DiskInstanceSpaceRepo for SqliteDiskInstanceSpaceRepo {
    async fn create_disk_instance_space(
        &self,
        admin: &SecurityIdentity,
        space: &NewDiskInstanceSpace,
    ) -> CatalogueResult<()> {
        validate::non_empty("disk_instance_name", &space.disk_instance_name)?;
        validate::non_empty("name", &space.name)?;
        validate::non_empty("free_space_query_url", &space.free_space_query_url)?;
        validate::non_zero("refresh_interval", space.refresh_interval)?;
        let refresh_interval = validate::to_db("refresh_interval", space.refresh_interval)?;
        let comment = validate::comment("comment", &space.comment)?;

        let mut tx = self.pool.begin().await?;
        common::require(&mut *tx, DISK_INSTANCE, &space.disk_instance_name).await?;
        if space_exists(&mut tx, &space.disk_instance_name, &space.name).await? {
            return Err(CatalogueError::already_exists(
                DISK_INSTANCE_SPACE,
                format!("{}:{}", space.disk_instance_name, space.name),
            ));
        }
        let now = common::now();
        sqlx::query(
            "INSERT INTO disk_instance_space (disk_instance_name, disk_instance_space_name, \
             free_space_query_url, refresh_interval, free_space, last_refresh_time, user_comment, \
             creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time) \
             VALUES (?, ?, ?, ?, 0, NULL, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&space.disk_instance_name)
        .bind(&space.name)
        .bind(&space.free_space_query_url)
        .bind(refresh_interval)
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

    async fn get_all_disk_instance_spaces(&self) -> CatalogueResult<Vec<DiskInstanceSpaceRow>> {
        let rows = sqlx::query_as::<_, DiskInstanceSpaceRow>(
            "SELECT disk_instance_name, disk_instance_space_name AS name, free_space_query_url, \
             refresh_interval, free_space, last_refresh_time, user_comment AS comment, \
             creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time \
             FROM disk_instance_space ORDER BY disk_instance_name, disk_instance_space_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn modify_disk_instance_space_query_url(
        &self,
        admin: &SecurityIdentity,
        disk_instance_name: &str,
        name: &str,
        free_space_query_url: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("disk_instance_name", disk_instance_name)?;
        validate::non_empty("name", name)?;
        validate::non_empty("free_space_query_url", free_space_query_url)?;
        self.update_space_column(
            admin,
            disk_instance_name,
            name,
            "free_space_query_url",
            free_space_query_url.to_string(),
        )
        .await
    }

    async fn modify_disk_instance_space_refresh_interval(
        &self,
        admin: &SecurityIdentity,
        disk_instance_name: &str,
        name: &str,
        refresh_interval: u64,
    ) -> CatalogueResult<()> {
        validate::non_empty("disk_instance_name", disk_instance_name)?;
        validate::non_empty("name", name)?;
        validate::non_zero("refresh_interval", refresh_interval)?;
        let value = validate::to_db("refresh_interval", refresh_interval)?;
        self.update_space_column(admin, disk_instance_name, name, "refresh_interval", value)
            .await
    }

    async fn modify_disk_instance_space_comment(
        &self,
        admin: &SecurityIdentity,
        disk_instance_name: &str,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("disk_instance_name", disk_instance_name)?;
        validate::non_empty("name", name)?;
        let comment = validate::comment("comment", comment)?;
        self.update_space_column(admin, disk_instance_name, name, "user_comment", comment)
            .await
    }

    async fn update_disk_instance_space_free_space(
        &self,
        disk_instance_name: &str,
        name: &str,
        free_space: u64,
    ) -> CatalogueResult<()> {
        let free_space = validate::to_db("free_space", free_space)?;
        let result = sqlx::query(
            "UPDATE disk_instance_space SET free_space = ?, last_refresh_time = ? \
             WHERE disk_instance_name = ? AND disk_instance_space_name = ?",
        )
        .bind(free_space)
        .bind(common::now())
        .bind(disk_instance_name)
        .bind(name)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(space_not_found(disk_instance_name, name));
        }
        Ok(())
    }

    async fn delete_disk_instance_space(
        &self,
        disk_instance_name: &str,
        name: &str,
    ) -> CatalogueResult<()> {
        let mut tx = self.pool.begin().await?;
        if !space_exists(&mut tx, disk_instance_name, name).await? {
            return Err(space_not_found(disk_instance_name, name));
        }
        rules::ensure_disk_instance_space_deletable(&mut tx, disk_instance_name, name).await?;
        sqlx::query(
            "DELETE FROM disk_instance_space \
             WHERE disk_instance_name = ? AND disk_instance_space_name = ?",
        )
        .bind(disk_instance_name)
        .bind(name)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }
}
