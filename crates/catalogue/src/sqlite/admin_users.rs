//! Administrators.

use super::common::{self, ADMIN_USER};
use crate::error::{CatalogueError, CatalogueResult};
use crate::models::AdminUserRow;
use crate::repos::AdminUserRepo;
use crate::validate;
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};
use tapecat_core::SecurityIdentity;

pub struct SqliteAdminUserRepo {
    pool: Pool<Sqlite>,
}

impl SqliteAdminUserRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminUserRepo for SqliteAdminUserRepo {
    async fn create_admin_user(
        &self,
        admin: &SecurityIdentity,
        username: &str,
        comment: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("username", username)?;
        let comment = validate::comment("comment", comment)?;

        let mut tx = self.pool.begin().await?;
        if common::exists(&mut *tx, ADMIN_USER, username).await? {
            return Err(CatalogueError::already_exists(ADMIN_USER.kind, username));
        }
        let now = common::now();
        sqlx::query(
            "INSERT INTO admin_user (admin_user_name, user_comment, \
             creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(username)
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

    async fn get_admin_users(&self) -> CatalogueResult<Vec<AdminUserRow>> {
        let rows = sqlx::query_as::<_, AdminUserRow>(
            "SELECT admin_user_name AS name, user_comment AS comment, \
             creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time \
             FROM admin_user ORDER BY admin_user_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn admin_user_exists(&self, username: &str) -> CatalogueResult<bool> {
        common::exists(&self.pool, ADMIN_USER, username).await
    }

    async fn modify_admin_user_comment(
        &self,
        admin: &SecurityIdentity,
        username: &str,
        comment: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("username", username)?;
        let comment = validate::comment("comment", comment)?;
        common::update_column(&self.pool, ADMIN_USER, username, "user_comment", comment, admin).await
    }

    async fn delete_admin_user(&self, username: &str) -> CatalogueResult<()> {
        common::delete_row(&self.pool, ADMIN_USER, username).await
    }
}
