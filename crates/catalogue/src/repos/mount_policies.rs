//! Mount policy and requester mount rule repositories.

use crate::error::CatalogueResult;
use crate::models::{
    MountPolicyRow, NewMountPolicy, RequesterActivityMountRuleRow, RequesterGroupMountRuleRow,
    RequesterMountRuleRow, RequesterRuleKey,
};
use async_trait::async_trait;
use tapecat_core::SecurityIdentity;

/// Repository for mount policies.
#[async_trait]
pub trait MountPolicyRepo: Send + Sync {
    async fn create_mount_policy(
        &self,
        admin: &SecurityIdentity,
        policy: &NewMountPolicy,
    ) -> CatalogueResult<()>;

    async fn get_mount_policies(&self) -> CatalogueResult<Vec<MountPolicyRow>>;

    async fn get_mount_policy(&self, name: &str) -> CatalogueResult<Option<MountPolicyRow>>;

    async fn modify_mount_policy_archive_priority(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        archive_priority: u64,
    ) -> CatalogueResult<()>;

    async fn modify_mount_policy_archive_min_request_age(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        min_request_age: u64,
    ) -> CatalogueResult<()>;

    async fn modify_mount_policy_retrieve_priority(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        retrieve_priority: u64,
    ) -> CatalogueResult<()>;

    async fn modify_mount_policy_retrieve_min_request_age(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        min_request_age: u64,
    ) -> CatalogueResult<()>;

    async fn modify_mount_policy_comment(
        &self,
        admin: &SecurityIdentity,
        name: &str,
        comment: &str,
    ) -> CatalogueResult<()>;

    /// Delete a mount policy no requester rule refers to.
    async fn delete_mount_policy(&self, name: &str) -> CatalogueResult<()>;
}

/// Every requester rule, grouped by kind.
#[derive(Debug, Clone, Default)]
pub struct RequesterMountRules {
    pub requesters: Vec<RequesterMountRuleRow>,
    pub groups: Vec<RequesterGroupMountRuleRow>,
    pub activities: Vec<RequesterActivityMountRuleRow>,
}

/// Repository for the rules mapping requesters to mount policies.
#[async_trait]
pub trait RequesterMountRuleRepo: Send + Sync {
    /// Create a rule. The disk instance and policy must exist and the key must be unused.
    async fn create_requester_mount_rule(
        &self,
        admin: &SecurityIdentity,
        disk_instance_name: &str,
        key: &RequesterRuleKey,
        mount_policy_name: &str,
        comment: &str,
    ) -> CatalogueResult<()>;

    async fn get_requester_mount_rules(&self) -> CatalogueResult<RequesterMountRules>;

    async fn modify_requester_mount_rule_policy(
        &self,
        admin: &SecurityIdentity,
        disk_instance_name: &str,
        key: &RequesterRuleKey,
        mount_policy_name: &str,
    ) -> CatalogueResult<()>;

    async fn modify_requester_mount_rule_comment(
        &self,
        admin: &SecurityIdentity,
        disk_instance_name: &str,
        key: &RequesterRuleKey,
        comment: &str,
    ) -> CatalogueResult<()>;

    async fn delete_requester_mount_rule(
        &self,
        disk_instance_name: &str,
        key: &RequesterRuleKey,
    ) -> CatalogueResult<()>;

    /// Resolve the policy for a request.
    ///
    /// An activity rule whose regex matches wins, then the requester rule, then
    /// the group rule.
    async fn get_mount_policy_for_requester(
        &self,
        disk_instance_name: &str,
        requester_name: &str,
        group_name: &str,
        activity: Option<&str>,
    ) -> CatalogueResult<Option<MountPolicyRow>>;
}
