//! Tape pools and their supply relationships.

use super::common::{self, TAPE_POOL, VIRTUAL_ORGANIZATION};
use super::rules;
use crate::error::{CatalogueError, CatalogueResult};
use crate::models::{NewTapePool, TapePoolRow, TapePoolSearchCriteria};
use crate::repos::TapePoolRepo;
use crate::validate;
use async_trait::async_trait;
use sqlx::{Pool, QueryBuilder, Sqlite};
use std::collections::HashMap;
use tapecat_core::SecurityIdentity;

/// Pool columns with counters aggregated over member tapes.
const SELECT_TAPE_POOL: &str = "SELECT tp.tape_pool_name AS name, \
    vo.virtual_organization_name AS vo, tp.nb_partial_tapes, tp.is_encrypted AS encryption, \
    tp.encryption_key_name, \
    COUNT(t.vid) AS nb_tapes, \
    COALESCE(SUM(CASE WHEN t.data_in_bytes = 0 THEN 1 ELSE 0 END), 0) AS nb_empty_tapes, \
    COALESCE(SUM(CASE WHEN t.tape_state = 'DISABLED' THEN 1 ELSE 0 END), 0) AS nb_disabled_tapes, \
    COALESCE(SUM(CASE WHEN t.is_full = 1 THEN 1 ELSE 0 END), 0) AS nb_full_tapes, \
    COALESCE(SUM(CASE WHEN t.tape_state = 'ACTIVE' AND t.is_full = 0 AND t.is_read_only = 0 \
        THEN 1 ELSE 0 END), 0) AS nb_writable_tapes, \
    COALESCE(SUM(t.capacity_in_bytes), 0) AS capacity_bytes, \
    COALESCE(SUM(t.data_in_bytes), 0) AS data_bytes, \
    COALESCE(SUM(t.last_fseq), 0) AS nb_physical_files, \
    tp.user_comment AS comment, \
    tp.creation_log_user_name, tp.creation_log_host_name, tp.creation_log_time, \
    tp.last_update_user_name, tp.last_update_host_name, tp.last_update_time \
    FROM tape_pool tp \
    JOIN virtual_organization vo ON vo.virtual_organization_id = tp.virtual_organization_id \
    LEFT JOIN tape t ON t.tape_pool_id = tp.tape_pool_id";

pub struct SqliteTapePoolRepo {
    pool: Pool<Sqlite>,
}

impl SqliteTapePoolRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn select_pools(
        &self,
        criteria: &TapePoolSearchCriteria,
    ) -> CatalogueResult<Vec<TapePoolRow>> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_TAPE_POOL);
        let mut sep = " WHERE ";
        if let Some(name) = &criteria.name {
            query.push(sep).push("tp.tape_pool_name = ").push_bind(name.clone());
            sep = " AND ";
        }
        if let Some(vo) = &criteria.vo {
            query
                .push(sep)
                .push("vo.virtual_organization_name = ")
                .push_bind(vo.clone());
            sep = " AND ";
        }
        if let Some(encrypted) = criteria.encrypted {
            query.push(sep).push("tp.is_encrypted = ").push_bind(encrypted);
        }
        query.push(" GROUP BY tp.tape_pool_id ORDER BY tp.tape_pool_name");

        let mut pools = query
            .build_query_as::<TapePoolRow>()
            .fetch_all(&self.pool)
            .await?;
        if !pools.is_empty() {
            self.attach_supply(&mut pools).await?;
        }
        Ok(pools)
    }

    /// Fill in supply sources (in configured order) and destinations (by name).
    async fn attach_supply(&self, pools: &mut [TapePoolRow]) -> CatalogueResult<()> {
        let links: Vec<(String, String)> = sqlx::query_as(
            "SELECT dst.tape_pool_name, src.tape_pool_name FROM tape_pool_supply s \
             JOIN tape_pool dst ON dst.tape_pool_id = s.tape_pool_id \
             JOIN tape_pool src ON src.tape_pool_id = s.supply_tape_pool_id \
             ORDER BY s.tape_pool_id, s.position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut sources: HashMap<&str, Vec<String>> = HashMap::new();
        let mut destinations: HashMap<&str, Vec<String>> = HashMap::new();
        for (destination, source) in &links {
            sources.entry(destination).or_default().push(source.clone());
            destinations.entry(source).or_default().push(destination.clone());
        }
        for pool in pools.iter_mut() {
            pool.supply_sources = sources.remove(pool.name.as_str()).unwrap_or_default();
            let mut dst = destinations.remove(pool.name.as_str()).unwrap_or_default();
            dst.sort();
            pool.supply_destinations = dst;
        }
        Ok(())
    }
}

#[async_trait]
impl TapePoolRepo for SqliteTapePoolRepo {
    async fn create_tape_pool(
        &self,
        admin: &SecurityIdentity,
        new_pool: &NewTapePool,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", &new_pool.name)?;
        validate::non_empty("vo", &new_pool.vo)?;
        validate::non_empty_if_set("encryption_key_name", new_pool.encryption_key_name.as_deref())?;
        let nb_partial_tapes = validate::to_db("nb_partial_tapes", new_pool.nb_partial_tapes)?;
        let comment = validate::comment("comment", &new_pool.comment)?;

        let mut tx = self.pool.begin().await?;
        if common::exists(&mut *tx, TAPE_POOL, &new_pool.name).await? {
            return Err(CatalogueError::already_exists(TAPE_POOL.kind, &new_pool.name));
        }
        let vo_id = common::require_id(&mut *tx, VIRTUAL_ORGANIZATION, &new_pool.vo).await?;
        let supply_ids = rules::resolve_supply(&mut tx, &new_pool.name, &new_pool.supply).await?;

        let now = common::now();
        let pool_id = sqlx::query(
            "INSERT INTO tape_pool (tape_pool_name, virtual_organization_id, nb_partial_tapes, \
             is_encrypted, encryption_key_name, user_comment, \
             creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_pool.name)
        .bind(vo_id)
        .bind(nb_partial_tapes)
        .bind(new_pool.encryption)
        .bind(&new_pool.encryption_key_name)
        .bind(comment)
        .bind(&admin.username)
        .bind(&admin.host)
        .bind(now)
        .bind(&admin.username)
        .bind(&admin.host)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
        rules::replace_supply(&mut tx, pool_id, &supply_ids).await?;
        tx.commit().await?;

        tracing::info!(
            tape_pool = %new_pool.name,
            vo = %new_pool.vo,
            supply = ?new_pool.supply,
            created_by = %admin,
            "Tape pool created"
        );
        Ok(())
    }

    async fn get_tape_pools(
        &self,
        criteria: &TapePoolSearchCriteria,
    ) -> CatalogueResult<Vec<TapePoolRow>> {
        validate::non_empty_if_set("name", criteria.name.as_deref())?;
        validate::non_empty_if_set("vo", criteria.vo.as_deref())?;
        if let Some(name) = &criteria.name {
            common::require(&self.pool, TAPE_POOL, name).await?;
        }
        if let Some(vo) = &criteria.vo {
            common::require(&self.pool, VIRTUAL_ORGANIZATION, vo).await?;
        }
        self.select_pools(criteria).await
    }

    async fn get_tape_pool(&self, name: &str) -> CatalogueResult<Option<TapePoolRow>> {
        validate::non_empty("name", name)?;
        let criteria = TapePoolSearchCriteria {
            name: Some(name.to_string()),
            ..Default::default()
        };
        Ok(self.select_pools(&criteria).await?.into_iter().next())
    }

    async fn tape_pool_exists(&self, name: &str) -> CatalogueResult<bool> {
        common::exists(&self.pool, TAPE_POOL, name).await
    }

    async fn modify_tape_pool_name(
        &self,
        admin: &SecurityIdentity,
        current_name: &str,
        new_name: &str,
    ) -> CatalogueResult<()> {
        let mut tx = self.pool.begin().await?;
        common::rename(&mut tx, TAPE_POOL, current_name, new_name, admin).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn modify_tape_pool_vo(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        vo: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        validate::non_empty("vo", vo)?;
        let mut tx = self.pool.begin().await?;
        let vo_id = common::require_id(&mut *tx, VIRTUAL_ORGANIZATION, vo).await?;
        common::update_column(&mut *tx, TAPE_POOL, name, "virtual_organization_id", vo_id, admin)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn modify_tape_pool_nb_partial_tapes(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        nb_partial_tapes: u64,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let value = validate::to_db("nb_partial_tapes", nb_partial_tapes)?;
        common::update_column(&self.pool, TAPE_POOL, name, "nb_partial_tapes", value, admin).await
    }

    async fn modify_tape_pool_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let comment = validate::comment("comment", comment)?;
        common::update_column(&self.pool, TAPE_POOL, name, "user_comment", comment, admin).await
    }

    async fn set_tape_pool_encryption(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        encryption: bool,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        common::update_column(&self.pool, TAPE_POOL, name, "is_encrypted", encryption, admin).await
    }

    async fn modify_tape_pool_encryption_key_name(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        encryption_key_name: Option<&str>,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        validate::non_empty_if_set("encryption_key_name", encryption_key_name)?;
        common::update_column(
            &self.pool,
            TAPE_POOL,
            name,
            "encryption_key_name",
            encryption_key_name.map(str::to_string),
            admin,
        )
        .await
    }

    async fn modify_tape_pool_supply(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        supply: &[String],
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let mut tx = self.pool.begin().await?;
        let pool_id = common::require_id(&mut *tx, TAPE_POOL, name).await?;
        let supply_ids = rules::resolve_supply(&mut tx, name, supply).await?;
        rules::replace_supply(&mut tx, pool_id, &supply_ids).await?;
        common::touch(&mut *tx, TAPE_POOL, name, admin).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_tape_pool(&self, name: &str) -> CatalogueResult<()> {
        let mut tx = self.pool.begin().await?;
        let pool_id = common::require_id(&mut *tx, TAPE_POOL, name).await?;
        rules::ensure_tape_pool_deletable(&mut tx, name, pool_id).await?;
        common::delete_row(&mut *tx, TAPE_POOL, name).await?;
        tx.commit().await?;
        Ok(())
    }
}
