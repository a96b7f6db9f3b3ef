//! Helpers shared by the SQLite repositories.

use crate::error::{CatalogueError, CatalogueResult};
use crate::validate;
use sqlx::sqlite::SqliteConnection;
use sqlx::{Encode, Executor, Sqlite, Type};
use tapecat_core::SecurityIdentity;
use time::OffsetDateTime;

/// A table addressed by a single natural key.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Entity {
    /// Human-readable kind used in error messages.
    pub kind: &'static str,
    pub table: &'static str,
    pub key_column: &'static str,
    /// Surrogate id column; equal to `key_column` for tables without one.
    pub id_column: &'static str,
}

pub(crate) const ADMIN_USER: Entity = Entity {
    kind: "admin user",
    table: "admin_user",
    key_column: "admin_user_name",
    id_column: "admin_user_name",
};

pub(crate) const DISK_INSTANCE: Entity = Entity {
    kind: "disk instance",
    table: "disk_instance",
    key_column: "disk_instance_name",
    id_column: "disk_instance_name",
};

pub(crate) const DISK_SYSTEM: Entity = Entity {
    kind: "disk system",
    table: "disk_system",
    key_column: "disk_system_name",
    id_column: "disk_system_name",
};

pub(crate) const VIRTUAL_ORGANIZATION: Entity = Entity {
    kind: "virtual organization",
    table: "virtual_organization",
    key_column: "virtual_organization_name",
    id_column: "virtual_organization_id",
};

pub(crate) const MEDIA_TYPE: Entity = Entity {
    kind: "media type",
    table: "media_type",
    key_column: "media_type_name",
    id_column: "media_type_id",
};

pub(crate) const PHYSICAL_LIBRARY: Entity = Entity {
    kind: "physical library",
    table: "physical_library",
    key_column: "physical_library_name",
    id_column: "physical_library_id",
};

pub(crate) const LOGICAL_LIBRARY: Entity = Entity {
    kind: "logical library",
    table: "logical_library",
    key_column: "logical_library_name",
    id_column: "logical_library_id",
};

pub(crate) const TAPE_POOL: Entity = Entity {
    kind: "tape pool",
    table: "tape_pool",
    key_column: "tape_pool_name",
    id_column: "tape_pool_id",
};

pub(crate) const TAPE: Entity = Entity {
    kind: "tape",
    table: "tape",
    key_column: "vid",
    id_column: "vid",
};

pub(crate) const STORAGE_CLASS: Entity = Entity {
    kind: "storage class",
    table: "storage_class",
    key_column: "storage_class_name",
    id_column: "storage_class_id",
};

pub(crate) const MOUNT_POLICY: Entity = Entity {
    kind: "mount policy",
    table: "mount_policy",
    key_column: "mount_policy_name",
    id_column: "mount_policy_name",
};

pub(crate) const TAPE_DRIVE: Entity = Entity {
    kind: "tape drive",
    table: "tape_drive",
    key_column: "drive_name",
    id_column: "drive_name",
};

pub(crate) fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Whether a row with the given key exists.
pub(crate) async fn exists<'e, E>(exec: E, entity: Entity, key: &str) -> CatalogueResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?)",
        entity.table, entity.key_column
    );
    let found: bool = sqlx::query_scalar(&sql).bind(key).fetch_one(exec).await?;
    Ok(found)
}

/// Fail with not-found unless a row with the given key exists.
pub(crate) async fn require<'e, E>(exec: E, entity: Entity, key: &str) -> CatalogueResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    if !exists(exec, entity, key).await? {
        return Err(CatalogueError::not_found(entity.kind, key));
    }
    Ok(())
}

/// Resolve a natural key to its surrogate id, failing with not-found.
pub(crate) async fn require_id<'e, E>(exec: E, entity: Entity, key: &str) -> CatalogueResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = ?",
        entity.id_column, entity.table, entity.key_column
    );
    let id: Option<i64> = sqlx::query_scalar(&sql)
        .bind(key)
        .fetch_optional(exec)
        .await?;
    id.ok_or_else(|| CatalogueError::not_found(entity.kind, key))
}

/// Set one column of one row and stamp the last-modification log.
pub(crate) async fn update_column<'e, E, T>(
    exec: E,
    entity: Entity,
    key: &str,
    column: &'static str,
    value: T,
    admin: &SecurityIdentity,
) -> CatalogueResult<()>
where
    E: Executor<'e, Database = Sqlite>,
    T: for<'q> Encode<'q, Sqlite> + Type<Sqlite> + Send + 'static,
{
    let sql = format!(
        "UPDATE {} SET {column} = ?, last_update_user_name = ?, last_update_host_name = ?, \
         last_update_time = ? WHERE {} = ?",
        entity.table, entity.key_column
    );
    let result = sqlx::query(&sql)
        .bind(value)
        .bind(&admin.username)
        .bind(&admin.host)
        .bind(now())
        .bind(key)
        .execute(exec)
        .await?;
    if result.rows_affected() == 0 {
        return Err(CatalogueError::not_found(entity.kind, key));
    }
    Ok(())
}

/// Stamp the last-modification log of a row whose change lives in another table.
pub(crate) async fn touch<'e, E>(
    exec: E,
    entity: Entity,
    key: &str,
    admin: &SecurityIdentity,
) -> CatalogueResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "UPDATE {} SET last_update_user_name = ?, last_update_host_name = ?, \
         last_update_time = ? WHERE {} = ?",
        entity.table, entity.key_column
    );
    let result = sqlx::query(&sql)
        .bind(&admin.username)
        .bind(&admin.host)
        .bind(now())
        .bind(key)
        .execute(exec)
        .await?;
    if result.rows_affected() == 0 {
        return Err(CatalogueError::not_found(entity.kind, key));
    }
    Ok(())
}

/// Rename a row, rejecting a name already taken by the same kind.
pub(crate) async fn rename(
    conn: &mut SqliteConnection,
    entity: Entity,
    current_name: &str,
    new_name: &str,
    admin: &SecurityIdentity,
) -> CatalogueResult<()> {
    validate::non_empty("current_name", current_name)?;
    validate::non_empty("new_name", new_name)?;
    require(&mut *conn, entity, current_name).await?;
    if current_name != new_name && exists(&mut *conn, entity, new_name).await? {
        return Err(CatalogueError::already_exists(entity.kind, new_name));
    }
    update_column(
        &mut *conn,
        entity,
        current_name,
        entity.key_column,
        new_name.to_string(),
        admin,
    )
    .await
}

/// Delete a row by key, failing with not-found if nothing was deleted.
pub(crate) async fn delete_row<'e, E>(exec: E, entity: Entity, key: &str) -> CatalogueResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("DELETE FROM {} WHERE {} = ?", entity.table, entity.key_column);
    let result = sqlx::query(&sql).bind(key).execute(exec).await?;
    if result.rows_affected() == 0 {
        return Err(CatalogueError::not_found(entity.kind, key));
    }
    Ok(())
}
