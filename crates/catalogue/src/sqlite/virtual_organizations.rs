//! Virtual organizations.

use super::common::{self, DISK_INSTANCE, TAPE_POOL, VIRTUAL_ORGANIZATION};
use super::rules;
use crate::error::{CatalogueError, CatalogueResult};
use crate::models::{NewVirtualOrganization, VirtualOrganizationRow};
use crate::repos::VirtualOrganizationRepo;
use crate::validate;
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};
use tapecat_core::SecurityIdentity;

const SELECT_VO: &str = "SELECT vo.virtual_organization_name AS name, \
    vo.read_max_drives, vo.write_max_drives, vo.max_file_size, vo.disk_instance_name, \
    vo.is_repack_vo, vo.user_comment AS comment, \
    vo.creation_log_user_name, vo.creation_log_host_name, vo.creation_log_time, \
    vo.last_update_user_name, vo.last_update_host_name, vo.last_update_time \
    FROM virtual_organization vo";

pub struct SqliteVirtualOrganizationRepo {
    pool: Pool<Sqlite>,
}

impl SqliteVirtualOrganizationRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VirtualOrganizationRepo for SqliteVirtualOrganizationRepo {
    async fn create_virtual_organization(
        &self,
        admin: &SecurityIdentity,
        vo: &NewVirtualOrganization,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", &vo.name)?;
        validate::non_empty("disk_instance_name", &vo.disk_instance_name)?;
        let comment = validate::comment("comment", &vo.comment)?;
        let read_max_drives = validate::to_db("read_max_drives", vo.read_max_drives)?;
        let write_max_drives = validate::to_db("write_max_drives", vo.write_max_drives)?;
        let max_file_size = validate::to_db("max_file_size", vo.max_file_size)?;

        let mut tx = self.pool.begin().await?;
        if common::exists(&mut *tx, VIRTUAL_ORGANIZATION, &vo.name).await? {
            return Err(CatalogueError::already_exists(VIRTUAL_ORGANIZATION.kind, &vo.name));
        }
        common::require(&mut *tx, DISK_INSTANCE, &vo.disk_instance_name).await?;
        if vo.is_repack_vo {
            rules::ensure_no_other_repack_vo(&mut tx, &vo.name).await?;
        }

        let now = common::now();
        sqlx::query(
            "INSERT INTO virtual_organization (virtual_organization_name, read_max_drives, \
             write_max_drives, max_file_size, disk_instance_name, is_repack_vo, user_comment, \
             creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&vo.name)
        .bind(read_max_drives)
        .bind(write_max_drives)
        .bind(max_file_size)
        .bind(&vo.disk_instance_name)
        .bind(vo.is_repack_vo)
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

        tracing::info!(vo = %vo.name, created_by = %admin, "Virtual organization created");
        Ok(())
    }

    async fn get_virtual_organizations(&self) -> CatalogueResult<Vec<VirtualOrganizationRow>> {
        let sql = format!("{SELECT_VO} ORDER BY vo.virtual_organization_name");
        let rows = sqlx::query_as::<_, VirtualOrganizationRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_virtual_organization(
        &self,
        name: &str,
    ) -> CatalogueResult<Option<VirtualOrganizationRow>> {
        let sql = format!("{SELECT_VO} WHERE vo.virtual_organization_name = ?");
        let row = sqlx::query_as::<_, VirtualOrganizationRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_default_virtual_organization_for_repack(
        &self,
    ) -> CatalogueResult<Option<VirtualOrganizationRow>> {
        let sql = format!("{SELECT_VO} WHERE vo.is_repack_vo = 1");
        let row = sqlx::query_as::<_, VirtualOrganizationRow>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_virtual_organization_of_tape_pool(
        &self,
        tape_pool_name: &str,
    ) -> CatalogueResult<VirtualOrganizationRow> {
        let sql = format!(
            "{SELECT_VO} JOIN tape_pool tp ON tp.virtual_organization_id = vo.virtual_organization_id \
             WHERE tp.tape_pool_name = ?"
        );
        let row = sqlx::query_as::<_, VirtualOrganizationRow>(&sql)
            .bind(tape_pool_name)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| CatalogueError::not_found(TAPE_POOL.kind, tape_pool_name))
    }

    async fn modify_virtual_organization_name(
        &self,
        admin: &SecurityIdentity,
        current_name: &str,
        new_name: &str,
    ) -> CatalogueResult<()> {
        let mut tx = self.pool.begin().await?;
        common::rename(&mut tx, VIRTUAL_ORGANIZATION, current_name, new_name, admin).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn modify_virtual_organization_read_max_drives(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        read_max_drives: u64,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let value = validate::to_db("read_max_drives", read_max_drives)?;
        common::update_column(&self.pool, VIRTUAL_ORGANIZATION, name, "read_max_drives", value, admin)
            .await
    }

    async fn modify_virtual_organization_write_max_drives(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        write_max_drives: u64,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let value = validate::to_db("write_max_drives", write_max_drives)?;
        common::update_column(&self.pool, VIRTUAL_ORGANIZATION, name, "write_max_drives", value, admin)
            .await
    }

    async fn modify_virtual_organization_max_file_size(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        max_file_size: u64,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let value = validate::to_db("max_file_size", max_file_size)?;
        common::update_column(&self.pool, VIRTUAL_ORGANIZATION, name, "max_file_size", value, admin)
            .await
    }

    async fn modify_virtual_organization_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let comment = validate::comment("comment", comment)?;
        common::update_column(&self.pool, VIRTUAL_ORGANIZATION, name, "user_comment", comment, admin)
            .await
    }

    async fn modify_virtual_organization_disk_instance_name(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        disk_instance_name: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        validate::non_empty("disk_instance_name", disk_instance_name)?;
        let mut tx = self.pool.begin().await?;
        common::require(&mut *tx, DISK_INSTANCE, disk_instance_name).await?;
        common::update_column(
            &mut *tx,
            VIRTUAL_ORGANIZATION,
            name,
            "disk_instance_name",
            disk_instance_name.to_string(),
            admin,
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn modify_virtual_organization_is_repack_vo(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        is_repack_vo: bool,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let mut tx = self.pool.begin().await?;
        if is_repack_vo {
            rules::ensure_no_other_repack_vo(&mut tx, name).await?;
        }
        common::update_column(&mut *tx, VIRTUAL_ORGANIZATION, name, "is_repack_vo", is_repack_vo, admin)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_virtual_organization(&self, name: &str) -> CatalogueResult<()> {
        let mut tx = self.pool.begin().await?;
        let vo_id = common::require_id(&mut *tx, VIRTUAL_ORGANIZATION, name).await?;
        rules::ensure_vo_deletable(&mut tx, name, vo_id).await?;
        common::delete_row(&mut *tx, VIRTUAL_ORGANIZATION, name).await?;
        tx.commit().await?;
        Ok(())
    }
}
