//! Consistency rules that span more than one entity kind.
//!
//! Deletes check inbound references here first so that callers get an error
//! naming the referencing kind instead of a bare constraint violation.

use super::common::{self, TAPE_POOL};
use crate::error::{CatalogueError, CatalogueResult};
use crate::validate;
use sqlx::sqlite::SqliteConnection;
use std::collections::HashSet;

async fn count(conn: &mut SqliteConnection, sql: &str, id: i64) -> CatalogueResult<i64> {
    let n: i64 = sqlx::query_scalar(sql).bind(id).fetch_one(&mut *conn).await?;
    Ok(n)
}

async fn count_by_name(conn: &mut SqliteConnection, sql: &str, name: &str) -> CatalogueResult<i64> {
    let n: i64 = sqlx::query_scalar(sql).bind(name).fetch_one(&mut *conn).await?;
    Ok(n)
}

pub(crate) async fn ensure_vo_deletable(
    conn: &mut SqliteConnection,
    name: &str,
    vo_id: i64,
) -> CatalogueResult<()> {
    let kind = "virtual organization";
    if count(conn, "SELECT COUNT(*) FROM tape_pool WHERE virtual_organization_id = ?", vo_id).await? > 0 {
        return Err(CatalogueError::in_use(kind, name, "tape pool"));
    }
    if count(conn, "SELECT COUNT(*) FROM storage_class WHERE virtual_organization_id = ?", vo_id).await? > 0 {
        return Err(CatalogueError::in_use(kind, name, "storage class"));
    }
    Ok(())
}

/// Only one VO system-wide may be the repack VO.
pub(crate) async fn ensure_no_other_repack_vo(
    conn: &mut SqliteConnection,
    name: &str,
) -> CatalogueResult<()> {
    let existing: Option<String> = sqlx::query_scalar(
        "SELECT virtual_organization_name FROM virtual_organization \
         WHERE is_repack_vo = 1 AND virtual_organization_name <> ?",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(existing) = existing {
        return Err(CatalogueError::Conflict(format!(
            "cannot make '{name}' the repack virtual organization: '{existing}' already is"
        )));
    }
    Ok(())
}

pub(crate) async fn ensure_tape_pool_deletable(
    conn: &mut SqliteConnection,
    name: &str,
    pool_id: i64,
) -> CatalogueResult<()> {
    let kind = "tape pool";
    if count(conn, "SELECT COUNT(*) FROM archive_route WHERE tape_pool_id = ?", pool_id).await? > 0 {
        return Err(CatalogueError::in_use(kind, name, "archive route"));
    }
    let nb_tapes = count(conn, "SELECT COUNT(*) FROM tape WHERE tape_pool_id = ?", pool_id).await?;
    if nb_tapes > 0 {
        return Err(CatalogueError::not_empty(
            kind,
            name,
            format!("it contains {nb_tapes} tape(s)"),
        ));
    }
    Ok(())
}

pub(crate) async fn ensure_storage_class_deletable(
    conn: &mut SqliteConnection,
    name: &str,
    storage_class_id: i64,
) -> CatalogueResult<()> {
    let kind = "storage class";
    if count(conn, "SELECT COUNT(*) FROM archive_route WHERE storage_class_id = ?", storage_class_id).await? > 0 {
        return Err(CatalogueError::in_use(kind, name, "archive route"));
    }
    if count(conn, "SELECT COUNT(*) FROM archive_file WHERE storage_class_id = ?", storage_class_id).await? > 0 {
        return Err(CatalogueError::in_use(kind, name, "archive file"));
    }
    if count(conn, "SELECT COUNT(*) FROM file_recycle_log WHERE storage_class_id = ?", storage_class_id).await? > 0 {
        return Err(CatalogueError::in_use(kind, name, "file recycle log"));
    }
    Ok(())
}

pub(crate) async fn ensure_media_type_deletable(
    conn: &mut SqliteConnection,
    name: &str,
    media_type_id: i64,
) -> CatalogueResult<()> {
    if count(conn, "SELECT COUNT(*) FROM tape WHERE media_type_id = ?", media_type_id).await? > 0 {
        return Err(CatalogueError::in_use("media type", name, "tape"));
    }
    Ok(())
}

pub(crate) async fn ensure_logical_library_deletable(
    conn: &mut SqliteConnection,
    name: &str,
    library_id: i64,
) -> CatalogueResult<()> {
    let nb_tapes = count(conn, "SELECT COUNT(*) FROM tape WHERE logical_library_id = ?", library_id).await?;
    if nb_tapes > 0 {
        return Err(CatalogueError::not_empty(
            "logical library",
            name,
            format!("it contains {nb_tapes} tape(s)"),
        ));
    }
    Ok(())
}

pub(crate) async fn ensure_physical_library_deletable(
    conn: &mut SqliteConnection,
    name: &str,
    library_id: i64,
) -> CatalogueResult<()> {
    if count(conn, "SELECT COUNT(*) FROM logical_library WHERE physical_library_id = ?", library_id).await? > 0 {
        return Err(CatalogueError::in_use("physical library", name, "logical library"));
    }
    Ok(())
}

pub(crate) async fn ensure_disk_instance_deletable(
    conn: &mut SqliteConnection,
    name: &str,
) -> CatalogueResult<()> {
    let kind = "disk instance";
    if count_by_name(conn, "SELECT COUNT(*) FROM virtual_organization WHERE disk_instance_name = ?", name).await? > 0 {
        return Err(CatalogueError::in_use(kind, name, "virtual organization"));
    }
    if count_by_name(conn, "SELECT COUNT(*) FROM disk_instance_space WHERE disk_instance_name = ?", name).await? > 0 {
        return Err(CatalogueError::in_use(kind, name, "disk instance space"));
    }
    if count_by_name(conn, "SELECT COUNT(*) FROM archive_file WHERE disk_instance_name = ?", name).await? > 0 {
        return Err(CatalogueError::in_use(kind, name, "archive file"));
    }
    let nb_rules: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM requester_mount_rule WHERE disk_instance_name = ?1) \
              + (SELECT COUNT(*) FROM requester_group_mount_rule WHERE disk_instance_name = ?1) \
              + (SELECT COUNT(*) FROM requester_activity_mount_rule WHERE disk_instance_name = ?1)",
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;
    if nb_rules > 0 {
        return Err(CatalogueError::in_use(kind, name, "requester mount rule"));
    }
    Ok(())
}

pub(crate) async fn ensure_disk_instance_space_deletable(
    conn: &mut SqliteConnection,
    disk_instance_name: &str,
    name: &str,
) -> CatalogueResult<()> {
    let n: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM disk_system WHERE disk_instance_name = ? AND disk_instance_space_name = ?",
    )
    .bind(disk_instance_name)
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;
    if n > 0 {
        return Err(CatalogueError::in_use(
            "disk instance space",
            format!("{disk_instance_name}:{name}"),
            "disk system",
        ));
    }
    Ok(())
}

pub(crate) async fn ensure_mount_policy_deletable(
    conn: &mut SqliteConnection,
    name: &str,
) -> CatalogueResult<()> {
    let kind = "mount policy";
    if count_by_name(conn, "SELECT COUNT(*) FROM requester_mount_rule WHERE mount_policy_name = ?", name).await? > 0 {
        return Err(CatalogueError::in_use(kind, name, "requester mount rule"));
    }
    if count_by_name(conn, "SELECT COUNT(*) FROM requester_group_mount_rule WHERE mount_policy_name = ?", name).await? > 0 {
        return Err(CatalogueError::in_use(kind, name, "requester group mount rule"));
    }
    if count_by_name(conn, "SELECT COUNT(*) FROM requester_activity_mount_rule WHERE mount_policy_name = ?", name).await? > 0 {
        return Err(CatalogueError::in_use(kind, name, "requester activity mount rule"));
    }
    Ok(())
}

/// A tape may only be deleted once nothing on it is still tracked.
pub(crate) async fn ensure_tape_deletable(conn: &mut SqliteConnection, vid: &str) -> CatalogueResult<()> {
    let nb_files = count_by_name(conn, "SELECT COUNT(*) FROM tape_file WHERE vid = ?", vid).await?;
    if nb_files > 0 {
        return Err(CatalogueError::not_empty(
            "tape",
            vid,
            format!("it holds {nb_files} tape file(s)"),
        ));
    }
    let nb_recycled = count_by_name(conn, "SELECT COUNT(*) FROM file_recycle_log WHERE vid = ?", vid).await?;
    if nb_recycled > 0 {
        return Err(CatalogueError::not_empty(
            "tape",
            vid,
            format!("it has {nb_recycled} file recycle log entries"),
        ));
    }
    Ok(())
}

/// Validate a supply list for `pool_name` and resolve it to pool ids, in order.
///
/// Every entry must name an existing pool other than `pool_name` itself, at most once.
pub(crate) async fn resolve_supply(
    conn: &mut SqliteConnection,
    pool_name: &str,
    supply: &[String],
) -> CatalogueResult<Vec<i64>> {
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(supply.len());
    for source in supply {
        validate::non_empty("supply", source)?;
        if source == pool_name {
            return Err(CatalogueError::invalid(
                "supply",
                format!("tape pool '{pool_name}' cannot supply itself"),
            ));
        }
        if !seen.insert(source.as_str()) {
            return Err(CatalogueError::invalid(
                "supply",
                format!("tape pool '{source}' is listed more than once"),
            ));
        }
        ids.push(common::require_id(&mut *conn, TAPE_POOL, source).await?);
    }
    Ok(ids)
}

/// Replace the supply sources of a pool.
pub(crate) async fn replace_supply(
    conn: &mut SqliteConnection,
    pool_id: i64,
    supply_ids: &[i64],
) -> CatalogueResult<()> {
    sqlx::query("DELETE FROM tape_pool_supply WHERE tape_pool_id = ?")
        .bind(pool_id)
        .execute(&mut *conn)
        .await?;
    for (position, supply_id) in supply_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO tape_pool_supply (tape_pool_id, supply_tape_pool_id, position) VALUES (?, ?, ?)",
        )
        .bind(pool_id)
        .bind(supply_id)
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
