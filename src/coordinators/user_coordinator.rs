use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::AppData;
use crate::coordinators::auth_coordinator::principal_scope;
use crate::errors::InternalError;
use crate::errors::internal::AuthorizationError;
use crate::services::VisibilityScope;
use crate::stores::{CreatedUser, CredentialStore, NewUser, RbacStore};
use crate::types::dto::user::CreateUserRequest;
use crate::types::internal::{HierarchyCode, RequestContext, RoleName};

/// This coordinator handles user lifecycle related operations
///
/// Super admins may create or delete anyone. Admins manage the managers and
/// agents reporting to them, managers manage their own agents, and agents
/// manage no one.
pub struct UserCoordinator {
    db: DatabaseConnection,
    credential_store: Arc<CredentialStore>,
    rbac_store: Arc<RbacStore>,
}

impl UserCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            credential_store: Arc::clone(&app_data.credential_store),
            rbac_store: Arc::clone(&app_data.rbac_store),
        }
    }

    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        request: CreateUserRequest,
    ) -> Result<CreatedUser, InternalError> {
        let scope = principal_scope(ctx)?;
        let mut input = NewUser {
            name: request.name,
            email: request.email,
            password: request.password,
            phone: request.phone.filter(|p| !p.trim().is_empty()),
            role_id: request.role_id,
            manager_code: request.manager_code,
            admin_code: request.admin_code,
            commission_bps: request.commission_bps,
        };

        if !scope.is_unrestricted() {
            let role = self
                .rbac_store
                .find_role(&self.db, input.role_id)
                .await?
                .ok_or_else(|| InternalError::validation("role_id", "unknown role"))?;
            self.constrain_to_scope(&scope, RoleName::parse(&role.name), &role.name, &mut input)
                .await?;
        }

        let created = self.credential_store.create_user(&self.db, input).await?;
        tracing::info!(
            "User {} created by {:?} (request {})",
            created.user.code,
            ctx.principal.as_ref().map(|p| p.user_id),
            ctx.request_id
        );
        Ok(created)
    }

    /// Pin hierarchy codes of a new user to the requester's branch
    async fn constrain_to_scope(
        &self,
        scope: &VisibilityScope,
        role: Option<RoleName>,
        role_label: &str,
        input: &mut NewUser,
    ) -> Result<(), InternalError> {
        let out_of_scope = |target: &str| -> InternalError {
            AuthorizationError::OutOfScope {
                target: target.to_string(),
            }
            .into()
        };

        match (scope, role) {
            (VisibilityScope::Admin(own), Some(RoleName::Manager | RoleName::Agent)) => {
                let admin_code = Self::pinned(input.admin_code.as_deref(), own)
                    .ok_or_else(|| out_of_scope(input.admin_code.as_deref().unwrap_or_default()))?;
                if let Some(manager_code) = input.manager_code.as_deref().and_then(HierarchyCode::parse) {
                    let manager = self
                        .credential_store
                        .find_manager_by_code(&self.db, manager_code.as_str())
                        .await?;
                    if let Some(manager) = manager {
                        if manager.admin_code.as_deref() != Some(own.as_str()) {
                            return Err(out_of_scope(manager_code.as_str()));
                        }
                    }
                }
                input.admin_code = Some(admin_code);
                Ok(())
            }
            (VisibilityScope::Manager(own), Some(RoleName::Agent)) => {
                let manager_code = Self::pinned(input.manager_code.as_deref(), own)
                    .ok_or_else(|| out_of_scope(input.manager_code.as_deref().unwrap_or_default()))?;
                input.manager_code = Some(manager_code);
                // The manager's admin is inherited
                input.admin_code = None;
                Ok(())
            }
            _ => Err(out_of_scope(role_label)),
        }
    }

    /// The requester's own code when `requested` is blank or equal to it
    fn pinned(requested: Option<&str>, own: &HierarchyCode) -> Option<String> {
        match requested.and_then(HierarchyCode::parse) {
            None => Some(own.as_str().to_string()),
            Some(code) if code == *own => Some(code.into()),
            Some(_) => None,
        }
    }

    /// Delete a user inside the requester's scope
    ///
    /// # Returns
    /// * `Ok(ids)` - Every deleted user id
    /// * `Err(InternalError::NotFound)` - No such user
    /// * `Err(AuthorizationError::OutOfScope)` - User outside the requester's branch
    pub async fn delete_user(
        &self,
        ctx: &RequestContext,
        user_id: i32,
    ) -> Result<Vec<i32>, InternalError> {
        let scope = principal_scope(ctx)?;
        let target = self
            .credential_store
            .find_user(&self.db, user_id)
            .await?
            .ok_or_else(|| InternalError::not_found("user", user_id))?;

        if !scope.is_unrestricted() {
            let (agent, manager) = self.credential_store.hierarchy_of(&self.db, user_id).await?;
            let in_scope = match &scope {
                VisibilityScope::Admin(own) => {
                    agent.is_some_and(|a| a.admin_code.as_deref() == Some(own.as_str()))
                        || manager.is_some_and(|m| m.admin_code.as_deref() == Some(own.as_str()))
                }
                VisibilityScope::Manager(own) => {
                    agent.is_some_and(|a| a.manager_code.as_deref() == Some(own.as_str()))
                }
                _ => false,
            };
            if !in_scope {
                tracing::warn!(
                    "Refusing to delete {} outside the caller's scope (request {})",
                    target.code,
                    ctx.request_id
                );
                return Err(AuthorizationError::OutOfScope {
                    target: target.code,
                }
                .into());
            }
        }

        self.credential_store.delete_user(&self.db, user_id).await
    }
}
