//! Administrator repository.

use crate::error::CatalogueResult;
use crate::models::AdminUserRow;
use async_trait::async_trait;
use tapecat_core::SecurityIdentity;

/// Repository for catalogue administrators.
#[async_trait]
pub trait AdminUserRepo: Send + Sync {
    async fn create_admin_user(
        &self,
        admin: &SecurityIdentity,
        username: &str,
        comment: &str,
    ) -> CatalogueResult<()>;

    async fn get_admin_users(&self) -> CatalogueResult<Vec<AdminUserRow>>;

    async fn admin_user_exists(&self, username: &str) -> CatalogueResult<bool>;

    async fn modify_admin_user_comment(
        &self,
        admin: &SecurityIdentity,
        username: &str,
        comment: &str,
    ) -> CatalogueResult<()>;

    async fn delete_admin_user(&self, username: &str) -> CatalogueResult<()>;
}
