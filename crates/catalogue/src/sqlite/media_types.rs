//! Media types.

use super::common::{self, MEDIA_TYPE, TAPE};
use super::rules;
use crate::error::{CatalogueError, CatalogueResult};
use crate::models::{MediaTypeRow, NewMediaType};
use crate::repos::MediaTypeRepo;
use crate::validate;
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};
use tapecat_core::SecurityIdentity;

const SELECT_MEDIA_TYPE: &str = "SELECT mt.media_type_name AS name, mt.cartridge, \
    mt.capacity_in_bytes, mt.primary_density_code, mt.secondary_density_code, mt.nb_wraps, \
    mt.min_lpos, mt.max_lpos, mt.user_comment AS comment, \
    mt.creation_log_user_name, mt.creation_log_host_name, mt.creation_log_time, \
    mt.last_update_user_name, mt.last_update_host_name, mt.last_update_time \
    FROM media_type mt";

pub struct SqliteMediaTypeRepo {
    pool: Pool<Sqlite>,
}

impl SqliteMediaTypeRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaTypeRepo for SqliteMediaTypeRepo {
    async fn create_media_type(
        &self,
        admin: &SecurityIdentity,
        mt: &NewMediaType,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", &mt.name)?;
        validate::non_empty("cartridge", &mt.cartridge)?;
        validate::non_zero("capacity_in_bytes", mt.capacity_in_bytes)?;
        let capacity = validate::to_db("capacity_in_bytes", mt.capacity_in_bytes)?;
        let comment = validate::comment("comment", &mt.comment)?;

        let mut tx = self.pool.begin().await?;
        if common::exists(&mut *tx, MEDIA_TYPE, &mt.name).await? {
            return Err(CatalogueError::already_exists(MEDIA_TYPE.kind, &mt.name));
        }
        let now = common::now();
        sqlx::query(
            "INSERT INTO media_type (media_type_name, cartridge, capacity_in_bytes, \
             primary_density_code, secondary_density_code, nb_wraps, min_lpos, max_lpos, \
             user_comment, creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&mt.name)
        .bind(&mt.cartridge)
        .bind(capacity)
        .bind(mt.primary_density_code)
        .bind(mt.secondary_density_code)
        .bind(mt.nb_wraps)
        .bind(mt.min_lpos)
        .bind(mt.max_lpos)
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

    async fn get_media_types(&self) -> CatalogueResult<Vec<MediaTypeRow>> {
        let sql = format!("{SELECT_MEDIA_TYPE} ORDER BY mt.media_type_name");
        let rows = sqlx::query_as::<_, MediaTypeRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_media_type_by_vid(&self, vid: &str) -> CatalogueResult<MediaTypeRow> {
        validate::non_empty("vid", vid)?;
        let sql = format!(
            "{SELECT_MEDIA_TYPE} JOIN tape t ON t.media_type_id = mt.media_type_id WHERE t.vid = ?"
        );
        let row = sqlx::query_as::<_, MediaTypeRow>(&sql)
            .bind(vid)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| CatalogueError::not_found(TAPE.kind, vid))
    }

    async fn modify_media_type_name(
        &self,
        admin: &SecurityIdentity,
        current_name: &str,
        new_name: &str,
    ) -> CatalogueResult<()> {
        let mut tx = self.pool.begin().await?;
        common::rename(&mut tx, MEDIA_TYPE, current_name, new_name, admin).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn modify_media_type_cartridge(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        cartridge: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        validate::non_empty("cartridge", cartridge)?;
        common::update_column(&self.pool, MEDIA_TYPE, name, "cartridge", cartridge.to_string(), admin)
            .await
    }

    async fn modify_media_type_capacity_in_bytes(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        capacity_in_bytes: u64,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        validate::non_zero("capacity_in_bytes", capacity_in_bytes)?;
        let value = validate::to_db("capacity_in_bytes", capacity_in_bytes)?;
        common::update_column(&self.pool, MEDIA_TYPE, name, "capacity_in_bytes", value, admin).await
    }

    async fn modify_media_type_primary_density_code(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        code: u8,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        common::update_column(&self.pool, MEDIA_TYPE, name, "primary_density_code", code, admin)
            .await
    }

    async fn modify_media_type_secondary_density_code(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        code: u8,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        common::update_column(&self.pool, MEDIA_TYPE, name, "secondary_density_code", code, admin)
            .await
    }

    async fn modify_media_type_nb_wraps(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        nb_wraps: Option<u32>,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        common::update_column(&self.pool, MEDIA_TYPE, name, "nb_wraps", nb_wraps, admin).await
    }

    async fn modify_media_type_min_lpos(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        min_lpos: Option<u32>,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        common::update_column(&self.pool, MEDIA_TYPE, name, "min_lpos", min_lpos, admin).await
    }

    async fn modify_media_type_max_lpos(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        max_lpos: Option<u32>,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        common::update_column(&self.pool, MEDIA_TYPE, name, "max_lpos", max_lpos, admin).await
    }

    async fn modify_media_type_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let comment = validate::comment("comment", comment)?;
        common::update_column(&self.pool, MEDIA_TYPE, name, "user_comment", comment, admin).await
    }

    async fn delete_media_type(&self, name: &str) -> CatalogueResult<()> {
        let mut tx = self.pool.begin().await?;
        let id = common::require_id(&mut *tx, MEDIA_TYPE, name).await?;
        rules::ensure_media_type_deletable(&mut tx, name, id).await?;
        common::delete_row(&mut *tx, MEDIA_TYPE, name).await?;
        tx.commit().await?;
        Ok(())
    }
}
