//! Archive routes.

use super::common::{self, STORAGE_CLASS, TAPE_POOL};
use crate::error::{CatalogueError, CatalogueResult};
use crate::models::{ArchiveRouteRow, NewArchiveRoute};
use crate::repos::ArchiveRouteRepo;
use crate::validate;
use async_trait::async_trait;
use sqlx::sqlite::SqliteConnection;
use sqlx::{Pool, Sqlite};
use tapecat_core::{ArchiveRouteType, SecurityIdentity};

const KIND: &str = "archive route";

const SELECT_ROUTE: &str = "SELECT sc.storage_class_name, ar.copy_nb, \
    ar.archive_route_type AS route_type, tp.tape_pool_name, ar.user_comment AS comment, \
    ar.creation_log_user_name, ar.creation_log_host_name, ar.creation_log_time, \
    ar.last_update_user_name, ar.last_update_host_name, ar.last_update_time \
    FROM archive_route ar \
    JOIN storage_class sc ON sc.storage_class_id = ar.storage_class_id \
    JOIN tape_pool tp ON tp.tape_pool_id = ar.tape_pool_id";

fn describe(storage_class_name: &str, copy_nb: u32, route_type: ArchiveRouteType) -> String {
    format!("{storage_class_name}:{copy_nb}:{}", route_type.as_str())
}

/// The same pool may not hold two copies of one storage class for the same route type.
async fn ensure_pool_not_used_by_other_copy(
    conn: &mut SqliteConnection,
    storage_class_id: i64,
    copy_nb: u32,
    route_type: ArchiveRouteType,
    tape_pool_id: i64,
    storage_class_name: &str,
    tape_pool_name: &str,
) -> CatalogueResult<()> {
    let other: Option<u32> = sqlx::query_scalar(
        "SELECT copy_nb FROM archive_route WHERE storage_class_id = ? \
         AND archive_route_type = ? AND tape_pool_id = ? AND copy_nb <> ?",
    )
    .bind(storage_class_id)
    .bind(route_type.as_str())
    .bind(tape_pool_id)
    .bind(copy_nb)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(other) = other {
        return Err(CatalogueError::Conflict(format!(
            "tape pool '{tape_pool_name}' already holds copy {other} of storage class \
             '{storage_class_name}' for {} routes",
            route_type.as_str()
        )));
    }
    Ok(())
}

pub struct SqliteArchiveRouteRepo {
    pool: Pool<Sqlite>,
}

impl SqliteArchiveRouteRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArchiveRouteRepo for SqliteArchiveRouteRepo {
    async fn create_archive_route(
        &self,
        admin: &SecurityIdentity,
        route: &NewArchiveRoute,
    ) -> CatalogueResult<()> {
        validate::non_empty("storage_class_name", &route.storage_class_name)?;
        validate::non_zero("copy_nb", u64::from(route.copy_nb))?;
        validate::non_empty("tape_pool_name", &route.tape_pool_name)?;
        let comment = validate::comment("comment", &route.comment)?;

        let mut tx = self.pool.begin().await?;
        let (storage_class_id, nb_copies): (i64, i64) = sqlx::query_as(
            "SELECT storage_class_id, nb_copies FROM storage_class WHERE storage_class_name = ?",
        )
        .bind(&route.storage_class_name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CatalogueError::not_found(STORAGE_CLASS.kind, &route.storage_class_name))?;
        if i64::from(route.copy_nb) > nb_copies {
            return Err(CatalogueError::invalid(
                "copy_nb",
                format!(
                    "{} exceeds the {nb_copies} copies of storage class '{}'",
                    route.copy_nb, route.storage_class_name
                ),
            ));
        }
        let tape_pool_id = common::require_id(&mut *tx, TAPE_POOL, &route.tape_pool_name).await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM archive_route WHERE storage_class_id = ? \
             AND copy_nb = ? AND archive_route_type = ?)",
        )
        .bind(storage_class_id)
        .bind(route.copy_nb)
        .bind(route.route_type.as_str())
        .fetch_one(&mut *tx)
        .await?;
        if exists {
            return Err(CatalogueError::already_exists(
                KIND,
                describe(&route.storage_class_name, route.copy_nb, route.route_type),
            ));
        }
        ensure_pool_not_used_by_other_copy(
            &mut tx,
            storage_class_id,
            route.copy_nb,
            route.route_type,
            tape_pool_id,
            &route.storage_class_name,
            &route.tape_pool_name,
        )
        .await?;

        let now = common::now();
        sqlx::query(
            "INSERT INTO archive_route (storage_class_id, copy_nb, archive_route_type, \
             tape_pool_id, user_comment, creation_log_user_name, creation_log_host_name, \
             creation_log_time, last_update_user_name, last_update_host_name, last_update_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(storage_class_id)
        .bind(route.copy_nb)
        .bind(route.route_type.as_str())
        .bind(tape_pool_id)
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

    async fn get_archive_routes(&self) -> CatalogueResult<Vec<ArchiveRouteRow>> {
        let sql = format!(
            "{SELECT_ROUTE} ORDER BY sc.storage_class_name, ar.copy_nb, ar.archive_route_type"
        );
        let rows = sqlx::query_as::<_, ArchiveRouteRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_archive_routes_for(
        &self,
        storage_class_name: &str,
        tape_pool_name: &str,
    ) -> CatalogueResult<Vec<ArchiveRouteRow>> {
        validate::non_empty("storage_class_name", storage_class_name)?;
        validate::non_empty("tape_pool_name", tape_pool_name)?;
        common::require(&self.pool, STORAGE_CLASS, storage_class_name).await?;
        common::require(&self.pool, TAPE_POOL, tape_pool_name).await?;
        let sql = format!(
            "{SELECT_ROUTE} WHERE sc.storage_class_name = ? AND tp.tape_pool_name = ? \
             ORDER BY ar.copy_nb, ar.archive_route_type"
        );
        let rows = sqlx::query_as::<_, ArchiveRouteRow>(&sql)
            .bind(storage_class_name)
            .bind(tape_pool_name)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn modify_archive_route_tape_pool_name(
        &self,
        admin: &SecurityIdentity,
        storage_class_name: &str,
        copy_nb: u32,
        route_type: ArchiveRouteType,
        tape_pool_name: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("storage_class_name", storage_class_name)?;
        validate::non_empty("tape_pool_name", tape_pool_name)?;

        let mut tx = self.pool.begin().await?;
        let storage_class_id = common::require_id(&mut *tx, STORAGE_CLASS, storage_class_name).await?;
        let tape_pool_id = common::require_id(&mut *tx, TAPE_POOL, tape_pool_name).await?;
        ensure_pool_not_used_by_other_copy(
            &mut tx,
            storage_class_id,
            copy_nb,
            route_type,
            tape_pool_id,
            storage_class_name,
            tape_pool_name,
        )
        .await?;
        let result = sqlx::query(
            "UPDATE archive_route SET tape_pool_id = ?, last_update_user_name = ?, \
             last_update_host_name = ?, last_update_time = ? \
             WHERE storage_class_id = ? AND copy_nb = ? AND archive_route_type = ?",
        )
        .bind(tape_pool_id)
        .bind(&admin.username)
        .bind(&admin.host)
        .bind(common::now())
        .bind(storage_class_id)
        .bind(copy_nb)
        .bind(route_type.as_str())
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogueError::not_found(
                KIND,
                describe(storage_class_name, copy_nb, route_type),
            ));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn modify_archive_route_comment(
        &self,
        admin: &SecurityIdentity,
        storage_class_name: &str,
        copy_nb: u32,
        route_type: ArchiveRouteType,
        comment: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("storage_class_name", storage_class_name)?;
        let comment = validate::comment("comment", comment)?;
        let result = sqlx::query(
            "UPDATE archive_route SET user_comment = ?, last_update_user_name = ?, \
             last_update_host_name = ?, last_update_time = ? \
             WHERE copy_nb = ? AND archive_route_type = ? AND storage_class_id = \
             (SELECT storage_class_id FROM storage_class WHERE storage_class_name = ?)",
        )
        .bind(comment)
        .bind(&admin.username)
        .bind(&admin.host)
        .bind(common::now())
        .bind(copy_nb)
        .bind(route_type.as_str())
        .bind(storage_class_name)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogueError::not_found(
                KIND,
                describe(storage_class_name, copy_nb, route_type),
            ));
        }
        Ok(())
    }

    async fn delete_archive_route(
        &self,
        storage_class_name: &str,
        copy_nb: u32,
        route_type: ArchiveRouteType,
    ) -> CatalogueResult<()> {
        validate::non_empty("storage_class_name", storage_class_name)?;
        let result = sqlx::query(
            "DELETE FROM archive_route WHERE copy_nb = ? AND archive_route_type = ? \
             AND storage_class_id = \
             (SELECT storage_class_id FROM storage_class WHERE storage_class_name = ?)",
        )
        .bind(copy_nb)
        .bind(route_type.as_str())
        .bind(storage_class_name)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogueError::not_found(
                KIND,
                describe(storage_class_name, copy_nb, route_type),
            ));
        }
        Ok(())
    }
}
