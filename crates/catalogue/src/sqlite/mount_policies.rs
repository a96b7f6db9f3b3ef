//! Mount policies and the requester rules that select them.

use super::common::{self, DISK_INSTANCE, MOUNT_POLICY};
use super::rules;
use crate::error::{CatalogueError, CatalogueResult};
use crate::models::{
    MountPolicyRow, NewMountPolicy, RequesterActivityMountRuleRow, RequesterGroupMountRuleRow,
    RequesterMountRuleRow, RequesterRuleKey,
};
use crate::repos::{MountPolicyRepo, RequesterMountRuleRepo, RequesterMountRules};
use crate::validate;
use async_trait::async_trait;
use regex::Regex;
use sqlx::{Pool, QueryBuilder, Sqlite};
use tapecat_core::SecurityIdentity;

const SELECT_MOUNT_POLICY: &str = "SELECT mount_policy_name AS name, archive_priority, \
    archive_min_request_age, retrieve_priority, retrieve_min_request_age, \
    user_comment AS comment, creation_log_user_name, creation_log_host_name, \
    creation_log_time, last_update_user_name, last_update_host_name, last_update_time \
    FROM mount_policy";

const LOG_COLUMNS: &str = "user_comment AS comment, creation_log_user_name, \
    creation_log_host_name, creation_log_time, last_update_user_name, last_update_host_name, \
    last_update_time";

// =============================================================================
// Mount policies
// =============================================================================

pub struct SqliteMountPolicyRepo {
    pool: Pool<Sqlite>,
}

impl SqliteMountPolicyRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn set_number(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        column: &'static str,
        value: u64,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let value = validate::to_db(column, value)?;
        common::update_column(&self.pool, MOUNT_POLICY, name, column, value, admin).await
    }
}

#[async_trait]
impl MountPolicyRepo for SqliteMountPolicyRepo {
    async fn create_mount_policy(
        &self,
        admin: &SecurityIdentity,
        policy: &NewMountPolicy,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", &policy.name)?;
        let archive_priority = validate::to_db("archive_priority", policy.archive_priority)?;
        let archive_age = validate::to_db("archive_min_request_age", policy.archive_min_request_age)?;
        let retrieve_priority = validate::to_db("retrieve_priority", policy.retrieve_priority)?;
        let retrieve_age =
            validate::to_db("retrieve_min_request_age", policy.retrieve_min_request_age)?;
        let comment = validate::comment("comment", &policy.comment)?;

        let mut tx = self.pool.begin().await?;
        if common::exists(&mut *tx, MOUNT_POLICY, &policy.name).await? {
            return Err(CatalogueError::already_exists(MOUNT_POLICY.kind, &policy.name));
        }
        let now = common::now();
        sqlx::query(
            "INSERT INTO mount_policy (mount_policy_name, archive_priority, \
             archive_min_request_age, retrieve_priority, retrieve_min_request_age, user_comment, \
             creation_log_user_name, creation_log_host_name, creation_log_time, \
             last_update_user_name, last_update_host_name, last_update_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&policy.name)
        .bind(archive_priority)
        .bind(archive_age)
        .bind(retrieve_priority)
        .bind(retrieve_age)
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

    async fn get_mount_policies(&self) -> CatalogueResult<Vec<MountPolicyRow>> {
        let sql = format!("{SELECT_MOUNT_POLICY} ORDER BY mount_policy_name");
        let rows = sqlx::query_as::<_, MountPolicyRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_mount_policy(&self, name: &str) -> CatalogueResult<Option<MountPolicyRow>> {
        let sql = format!("{SELECT_MOUNT_POLICY} WHERE mount_policy_name = ?");
        let row = sqlx::query_as::<_, MountPolicyRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn modify_mount_policy_archive_priority(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        archive_priority: u64,
    ) -> CatalogueResult<()> {
        self.set_number(admin, name, "archive_priority", archive_priority)
            .await
    }

    async fn modify_mount_policy_archive_min_request_age(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        min_request_age: u64,
    ) -> CatalogueResult<()> {
        self.set_number(admin, name, "archive_min_request_age", min_request_age)
            .await
    }

    async fn modify_mount_policy_retrieve_priority(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        retrieve_priority: u64,
    ) -> CatalogueResult<()> {
        self.set_number(admin, name, "retrieve_priority", retrieve_priority)
            .await
    }

    async fn modify_mount_policy_retrieve_min_request_age(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        min_request_age: u64,
    ) -> CatalogueResult<()> {
        self.set_number(admin, name, "retrieve_min_request_age", min_request_age)
            .await
    }

    async fn modify_mount_policy_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("name", name)?;
        let comment = validate::comment("comment", comment)?;
        common::update_column(&self.pool, MOUNT_POLICY, name, "user_comment", comment, admin).await
    }

    async fn delete_mount_policy(&self, name: &str) -> CatalogueResult<()> {
        let mut tx = self.pool.begin().await?;
        common::require(&mut *tx, MOUNT_POLICY, name).await?;
        rules::ensure_mount_policy_deletable(&mut tx, name).await?;
        common::delete_row(&mut *tx, MOUNT_POLICY, name).await?;
        tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// Requester rules
// =============================================================================

/// Table and key columns of one rule kind.
struct RuleTable {
    table: &'static str,
    keys: Vec<(&'static str, String)>,
}

impl RuleTable {
    fn of(key: &RequesterRuleKey) -> CatalogueResult<Self> {
        match key {
            RequesterRuleKey::Requester { requester_name } => {
                validate::non_empty("requester_name", requester_name)?;
                Ok(Self {
                    table: "requester_mount_rule",
                    keys: vec![("requester_name", requester_name.clone())],
                })
            }
            RequesterRuleKey::Group { group_name } => {
                validate::non_empty("group_name", group_name)?;
                Ok(Self {
                    table: "requester_group_mount_rule",
                    keys: vec![("requester_group_name", group_name.clone())],
                })
            }
            RequesterRuleKey::Activity {
                requester_name,
                activity_regex,
            } => {
                validate::non_empty("requester_name", requester_name)?;
                validate::regex("activity_regex", activity_regex)?;
                Ok(Self {
                    table: "requester_activity_mount_rule",
                    keys: vec![
                        ("requester_name", requester_name.clone()),
                        ("activity_regex", activity_regex.clone()),
                    ],
                })
            }
        }
    }

    /// Append `WHERE disk_instance_name = ? AND <key> = ? ...` to a query.
    fn push_where(&self, query: &mut QueryBuilder<'_, Sqlite>, disk_instance_name: &str) {
        query
            .push(" WHERE disk_instance_name = ")
            .push_bind(disk_instance_name.to_string());
        for (column, value) in &self.keys {
            query
                .push(" AND ")
                .push(*column)
                .push(" = ")
                .push_bind(value.clone());
        }
    }
}

pub struct SqliteRequesterMountRuleRepo {
    pool: Pool<Sqlite>,
}

impl SqliteRequesterMountRuleRepo {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Update one column of one rule and stamp its modification log.
    async fn update_rule(
        &self,
        admin: &SecurityIdentity,
        disk_instance_name: &str,
        key: &RequesterRuleKey,
        column: &'static str,
        value: String,
    ) -> CatalogueResult<()> {
        validate::non_empty("disk_instance_name", disk_instance_name)?;
        let rule = RuleTable::of(key)?;
        let mut query = QueryBuilder::<Sqlite>::new("UPDATE ");
        query
            .push(rule.table)
            .push(" SET ")
            .push(column)
            .push(" = ")
            .push_bind(value)
            .push(", last_update_user_name = ")
            .push_bind(admin.username.clone())
            .push(", last_update_host_name = ")
            .push_bind(admin.host.clone())
            .push(", last_update_time = ")
            .push_bind(common::now());
        rule.push_where(&mut query, disk_instance_name);

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(CatalogueError::not_found(
                key.kind(),
                key.describe(disk_instance_name),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RequesterMountRuleRepo for SqliteRequesterMountRuleRepo {
    async fn create_requester_mount_rule(
        &self,
        admin: &SecurityIdentity,
        disk_instance_name: &str,
        key: &RequesterRuleKey,
        mount_policy_name: &str,
        comment: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("disk_instance_name", disk_instance_name)?;
        validate::non_empty("mount_policy_name", mount_policy_name)?;
        let rule = RuleTable::of(key)?;
        let comment = validate::comment("comment", comment)?;

        let mut tx = self.pool.begin().await?;
        common::require(&mut *tx, DISK_INSTANCE, disk_instance_name).await?;
        common::require(&mut *tx, MOUNT_POLICY, mount_policy_name).await?;

        let mut probe = QueryBuilder::<Sqlite>::new("SELECT EXISTS(SELECT 1 FROM ");
        probe.push(rule.table);
        rule.push_where(&mut probe, disk_instance_name);
        probe.push(")");
        let exists: bool = probe.build_query_scalar().fetch_one(&mut *tx).await?;
        if exists {
            return Err(CatalogueError::already_exists(
                key.kind(),
                key.describe(disk_instance_name),
            ));
        }

        let now = common::now();
        let mut insert = QueryBuilder::<Sqlite>::new("INSERT INTO ");
        insert.push(rule.table).push(" (disk_instance_name");
        for (column, _) in &rule.keys {
            insert.push(", ").push(*column);
        }
        insert.push(
            ", mount_policy_name, user_comment, creation_log_user_name, creation_log_host_name, \
             creation_log_time, last_update_user_name, last_update_host_name, last_update_time) ",
        );
        insert.push_values(std::iter::once(()), |mut row, ()| {
            row.push_bind(disk_instance_name.to_string());
            for (_, value) in &rule.keys {
                row.push_bind(value.clone());
            }
            row.push_bind(mount_policy_name.to_string())
                .push_bind(comment.clone())
                .push_bind(admin.username.clone())
                .push_bind(admin.host.clone())
                .push_bind(now)
                .push_bind(admin.username.clone())
                .push_bind(admin.host.clone())
                .push_bind(now);
        });
        insert.build().execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_requester_mount_rules(&self) -> CatalogueResult<RequesterMountRules> {
        let requesters = sqlx::query_as::<_, RequesterMountRuleRow>(&format!(
            "SELECT disk_instance_name, requester_name, mount_policy_name, {LOG_COLUMNS} \
             FROM requester_mount_rule ORDER BY disk_instance_name, requester_name"
        ))
        .fetch_all(&self.pool)
        .await?;
        let groups = sqlx::query_as::<_, RequesterGroupMountRuleRow>(&format!(
            "SELECT disk_instance_name, requester_group_name, mount_policy_name, {LOG_COLUMNS} \
             FROM requester_group_mount_rule ORDER BY disk_instance_name, requester_group_name"
        ))
        .fetch_all(&self.pool)
        .await?;
        let activities = sqlx::query_as::<_, RequesterActivityMountRuleRow>(&format!(
            "SELECT disk_instance_name, requester_name, activity_regex, mount_policy_name, \
             {LOG_COLUMNS} FROM requester_activity_mount_rule \
             ORDER BY disk_instance_name, requester_name, activity_regex"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(RequesterMountRules {
            requesters,
            groups,
            activities,
        })
    }

    async fn modify_requester_mount_rule_policy(
        &self,
        admin: &SecurityIdentity,
        disk_instance_name: &str,
        key: &RequesterRuleKey,
        mount_policy_name: &str,
    ) -> CatalogueResult<()> {
        validate::non_empty("mount_policy_name", mount_policy_name)?;
        common::require(&self.pool, MOUNT_POLICY, mount_policy_name).await?;
        self.update_rule(
            admin,
            disk_instance_name,
            key,
            "mount_policy_name",
            mount_policy_name.to_string(),
        )
        .await
    }

    async fn modify_requester_mount_rule_comment(
        &self,
        admin: &SecurityIdentity,
        disk_instance_name: &str,
        key: &RequesterRuleKey,
        comment: &str,
    ) -> CatalogueResult<()> {
        let comment = validate::comment("comment", comment)?;
        self.update_rule(admin, disk_instance_name, key, "user_comment", comment)
            .await
    }

    async fn delete_requester_mount_rule(
        &self,
        disk_instance_name: &str,
        key: &RequesterRuleKey,
    ) -> CatalogueResult<()> {
        validate::non_empty("disk_instance_name", disk_instance_name)?;
        let rule = RuleTable::of(key)?;
        let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM ");
        query.push(rule.table);
        rule.push_where(&mut query, disk_instance_name);
        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(CatalogueError::not_found(
                key.kind(),
                key.describe(disk_instance_name),
            ));
        }
        Ok(())
    }

    async fn get_mount_policy_for_requester(
        &self,
        disk_instance_name: &str,
        requester_name: &str,
        group_name: &str,
        activity: Option<&str>,
    ) -> CatalogueResult<Option<MountPolicyRow>> {
        validate::non_empty("disk_instance_name", disk_instance_name)?;
        validate::non_empty("requester_name", requester_name)?;

        if let Some(activity) = activity {
            let candidates: Vec<(String, String)> = sqlx::query_as(
                "SELECT activity_regex, mount_policy_name FROM requester_activity_mount_rule \
                 WHERE disk_instance_name = ? AND requester_name = ? ORDER BY activity_regex",
            )
            .bind(disk_instance_name)
            .bind(requester_name)
            .fetch_all(&self.pool)
            .await?;
            for (pattern, policy) in candidates {
                let regex = Regex::new(&pattern)
                    .map_err(|e| CatalogueError::invalid("activity_regex", e.to_string()))?;
                if regex.is_match(activity) {
                    return self.policy(&policy).await;
                }
            }
        }

        let by_requester: Option<String> = sqlx::query_scalar(
            "SELECT mount_policy_name FROM requester_mount_rule \
             WHERE disk_instance_name = ? AND requester_name = ?",
        )
        .bind(disk_instance_name)
        .bind(requester_name)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(policy) = by_requester {
            return self.policy(&policy).await;
        }

        let by_group: Option<String> = sqlx::query_scalar(
            "SELECT mount_policy_name FROM requester_group_mount_rule \
             WHERE disk_instance_name = ? AND requester_group_name = ?",
        )
        .bind(disk_instance_name)
        .bind(group_name)
        .fetch_optional(&self.pool)
        .await?;
        match by_group {
            Some(policy) => self.policy(&policy).await,
            None => Ok(None),
        }
    }
}

impl SqliteRequesterMountRuleRepo {
    async fn policy(&self, name: &str) -> CatalogueResult<Option<MountPolicyRow>> {
        let sql = format!("{SELECT_MOUNT_POLICY} WHERE mount_policy_name = ?");
        let row = sqlx::query_as::<_, MountPolicyRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
