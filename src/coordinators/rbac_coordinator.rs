use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::AppData;
use crate::errors::InternalError;
use crate::stores::RbacStore;
use crate::types::db::{permission, role};
use crate::types::internal::RequestContext;

/// Role and permission administration for the settings screen
pub struct RbacCoordinator {
    db: DatabaseConnection,
    rbac_store: Arc<RbacStore>,
}

impl RbacCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            rbac_store: Arc::clone(&app_data.rbac_store),
        }
    }

    /// Every role with its granted permissions
    pub async fn roles_with_permissions(
        &self,
    ) -> Result<Vec<(role::Model, Vec<permission::Model>)>, InternalError> {
        let roles = self.rbac_store.list_roles(&self.db).await?;
        let mut result = Vec::with_capacity(roles.len());
        for role in roles {
            let permissions = self.rbac_store.role_permissions(&self.db, role.id).await?;
            result.push((role, permissions));
        }
        Ok(result)
    }

    pub async fn permissions(&self) -> Result<Vec<permission::Model>, InternalError> {
        self.rbac_store.list_permissions(&self.db).await
    }

    /// Roles and effective permissions of the caller
    pub async fn my_permissions(
        &self,
        ctx: &RequestContext,
    ) -> Result<(Vec<role::Model>, Vec<permission::Model>), InternalError> {
        let principal = ctx.require_principal()?;
        let roles = self.rbac_store.resolve_roles(&self.db, principal.user_id).await;
        let permissions = self
            .rbac_store
            .resolve_permissions(&self.db, principal.user_id)
            .await;
        Ok((roles, permissions))
    }

    pub async fn assign_roles(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        role_ids: &[i32],
    ) -> Result<Vec<role::Model>, InternalError> {
        let roles = self.rbac_store.assign_roles(&self.db, user_id, role_ids).await?;
        tracing::info!(
            "User {} now holds roles {:?} (request {})",
            user_id,
            roles.iter().map(|r| r.id).collect::<Vec<_>>(),
            ctx.request_id
        );
        Ok(roles)
    }

    pub async fn replace_role_permissions(
        &self,
        ctx: &RequestContext,
        role_id: i32,
        permission_ids: &[i32],
    ) -> Result<Vec<permission::Model>, InternalError> {
        let permissions = self
            .rbac_store
            .replace_role_permissions(&self.db, role_id, permission_ids)
            .await?;
        tracing::info!(
            "Role {} now grants {} permissions (request {})",
            role_id,
            permissions.len(),
            ctx.request_id
        );
        Ok(permissions)
    }
}
