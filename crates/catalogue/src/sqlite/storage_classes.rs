//! Storage classes.

use super::common::{self, STORAGE_CLASS, VIRTUAL_ORGANIZATION};
use super::rules;
use crate::error::{CatalogueError, CatalogueResult};
use crate::models::{NewStorageClass, StorageClassRow};
use crate::repos::StorageClassRepo;
use crate::validate;
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};
use tapecat_core::SecurityIdentity;

const SELECT_STORAGE_CLASS: &str = "SELECT sc.storage_class_name AS name, sc.nb_copies, \
    vo.virtual_organization_name AS vo, sc.user_comment AS comment, \
    sc.creation_log_user_name, sc.creation_log_host_name, sc.creation_log_time, \
    sc.last_update_user_name, sc.last_update_host_name, sc.last_update_time \
    FROM storage_class sc \
    JOIN virtual_organization vo ON vo.virtual_organization_id = sc.virtual_organization_id";

pub struct SqliteStorageClassRepo {
    pool: Pool<Sqlite>,
}

impl SqliteStorageClassRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StorageClassRepo for SqliteStorageClassRepo {
    async fn create_storage_class(
        &self,
        admin: &SecurityIdentity,
        sc: &NewStorageClass,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", &sc.name)?;
        validate::non_zero("nb_copies", sc.nb_copies)?;
        validate::non_empty("vo", &sc.vo)?;
        let nb_copies = validate::to_db("nb_copies", sc.nb_copies)?;
        let comment = validate::comment("comment", &sc.comment)?;

        let mut tx = self.pool.begin().await?;
        if common::exists(&mut *tx, STORAGE_CLASS, &sc.name).await? {
            return Err(CatalogueError::already_exists(STORAGE_CLASS.kind, &sc.name));
        }
        let vo_id = common::require_id(&mut *tx, VIRTUAL_ORGANIZATION, &sc.vo).await?;
        let now = common::now();
        sqlx::query(
            "INSERT INTO storage_class (storage_class_name, nb_copies, virtual_organization_id, \
             user_comment, creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&sc.name)
        .bind(nb_copies)
        .bind(vo_id)
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

    async fn get_storage_classes(&self) -> CatalogueResult<Vec<StorageClassRow>> {
        let sql = format!("{SELECT_STORAGE_CLASS} ORDER BY sc.storage_class_name");
        let rows = sqlx::query_as::<_, StorageClassRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_storage_class(&self, name: &str) -> CatalogueResult<Option<StorageClassRow>> {
        let sql = format!("{SELECT_STORAGE_CLASS} WHERE sc.storage_class_name = ?");
        let row = sqlx::query_as::<_, StorageClassRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn modify_storage_class_name(
        &self,
        admin: &SecurityIdentity,
        current_name: &str,
        new_name: &str,
    ) -> CatalogueResult<()> {
        let mut tx = self.pool.begin().await?;
        common::rename(&mut tx, STORAGE_CLASS, current_name, new_name, admin).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn modify_storage_class_nb_copies(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        nb_copies: u64,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        validate::non_zero("nb_copies", nb_copies)?;
        let value = validate::to_db("nb_copies", nb_copies)?;

        let mut tx = self.pool.begin().await?;
        let sc_id = common::require_id(&mut *tx, STORAGE_CLASS, name).await?;
        // Every route's copy number must stay within the storage class.
        let highest_copy: Option<i64> =
            sqlx::query_scalar("SELECT MAX(copy_nb) FROM archive_route WHERE storage_class_id = ?")
                .bind(sc_id)
                .fetch_one(&mut *tx)
                .await?;
        if highest_copy.is_some_and(|copy_nb| copy_nb > value) {
            return Err(CatalogueError::in_use(
                STORAGE_CLASS.kind,
                name,
                "archive route",
            ));
        }
        common::update_column(&mut *tx, STORAGE_CLASS, name, "nb_copies", value, admin).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn modify_storage_class_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let comment = validate::comment("comment", comment)?;
        common::update_column(&self.pool, STORAGE_CLASS, name, "user_comment", comment, admin).await
    }

    async fn modify_storage_class_vo(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        vo: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        validate::non_empty("vo", vo)?;
        let mut tx = self.pool.begin().await?;
        let vo_id = common::require_id(&mut *tx, VIRTUAL_ORGANIZATION, vo).await?;
        common::update_column(&mut *tx, STORAGE_CLASS, name, "virtual_organization_id", vo_id, admin)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_storage_class(&self, name: &str) -> CatalogueResult<()> {
        let mut tx = self.pool.begin().await?;
        let id = common::require_id(&mut *tx, STORAGE_CLASS, name).await?;
        rules::ensure_storage_class_deletable(&mut tx, name, id).await?;
        common::delete_row(&mut *tx, STORAGE_CLASS, name).await?;
        tx.commit().await?;
        Ok(())
    }
}
