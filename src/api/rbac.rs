use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, Tags, param::Path, payload::Json};

use crate::api::auth::BearerAuth;
use crate::api::helpers;
use crate::coordinators::{AuthCoordinator, RbacCoordinator};
use crate::errors::ApiError;
use crate::services::PermissionGate;
use crate::types::db::{permission, role};
use crate::types::dto::rbac::{
    AssignRolesRequest, MyPermissionsResponse, PermissionResponse, ReplacePermissionsRequest,
    RoleResponse, RoleWithPermissions,
};
use crate::types::internal::PermissionTag;

const ROLE_LIST_GATE: PermissionGate = PermissionGate::any_of(&[PermissionTag::ROLE_LIST]);
const ROLE_EDIT_GATE: PermissionGate = PermissionGate::any_of(&[PermissionTag::ROLE_EDIT]);
const PERMISSION_LIST_GATE: PermissionGate =
    PermissionGate::any_of(&[PermissionTag::PERMISSION_LIST]);
const PERMISSION_EDIT_GATE: PermissionGate =
    PermissionGate::any_of(&[PermissionTag::PERMISSION_EDIT]);

#[derive(Tags)]
enum RbacTags {
    /// Roles and permissions
    Rbac,
}

/// Role and permission administration endpoints
pub struct RbacApi {
    auth_coordinator: Arc<AuthCoordinator>,
    rbac_coordinator: Arc<RbacCoordinator>,
}

impl RbacApi {
    pub fn new(auth_coordinator: Arc<AuthCoordinator>, rbac_coordinator: Arc<RbacCoordinator>) -> Self {
        Self {
            auth_coordinator,
            rbac_coordinator,
        }
    }
}

#[OpenApi(prefix_path = "/rbac")]
impl RbacApi {
    /// List roles with their permissions
    #[oai(path = "/roles", method = "get", tag = "RbacTags::Rbac")]
    async fn list_roles(
        &self,
        req: &Request,
        auth: BearerAuth,
    ) -> Result<Json<Vec<RoleWithPermissions>>, ApiError> {
        helpers::gated_context(&self.auth_coordinator, req, &auth, &ROLE_LIST_GATE).await?;
        let roles = self.rbac_coordinator.roles_with_permissions().await?;

        Ok(Json(
            roles
                .into_iter()
                .map(|(role, permissions)| RoleWithPermissions {
                    id: role.id,
                    name: role.name,
                    permissions: permissions.into_iter().map(permission_response).collect(),
                })
                .collect(),
        ))
    }

    /// List every permission
    #[oai(path = "/permissions", method = "get", tag = "RbacTags::Rbac")]
    async fn list_permissions(
        &self,
        req: &Request,
        auth: BearerAuth,
    ) -> Result<Json<Vec<PermissionResponse>>, ApiError> {
        helpers::gated_context(&self.auth_coordinator, req, &auth, &PERMISSION_LIST_GATE).await?;
        let permissions = self.rbac_coordinator.permissions().await?;
        Ok(Json(permissions.into_iter().map(permission_response).collect()))
    }

    /// The caller's roles and effective permissions
    #[oai(path = "/me/permissions", method = "get", tag = "RbacTags::Rbac")]
    async fn my_permissions(
        &self,
        req: &Request,
        auth: BearerAuth,
    ) -> Result<Json<MyPermissionsResponse>, ApiError> {
        let ctx = helpers::authenticated_context(&self.auth_coordinator, req, &auth).await?;
        let (roles, permissions) = self.rbac_coordinator.my_permissions(&ctx).await?;

        Ok(Json(MyPermissionsResponse {
            roles: roles.into_iter().map(role_response).collect(),
            permissions: permissions.into_iter().map(|p| p.name).collect(),
        }))
    }

    /// Replace a user's roles
    #[oai(path = "/users/:id/roles", method = "put", tag = "RbacTags::Rbac")]
    async fn assign_roles(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<i32>,
        body: Json<AssignRolesRequest>,
    ) -> Result<Json<Vec<RoleResponse>>, ApiError> {
        let ctx = helpers::gated_context(&self.auth_coordinator, req, &auth, &ROLE_EDIT_GATE).await?;
        let roles = self
            .rbac_coordinator
            .assign_roles(&ctx, id.0, &body.role_ids)
            .await?;
        Ok(Json(roles.into_iter().map(role_response).collect()))
    }

    /// Replace a role's permissions
    #[oai(path = "/roles/:id/permissions", method = "put", tag = "RbacTags::Rbac")]
    async fn replace_permissions(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<i32>,
        body: Json<ReplacePermissionsRequest>,
    ) -> Result<Json<Vec<PermissionResponse>>, ApiError> {
        let ctx =
            helpers::gated_context(&self.auth_coordinator, req, &auth, &PERMISSION_EDIT_GATE).await?;
        let permissions = self
            .rbac_coordinator
            .replace_role_permissions(&ctx, id.0, &body.permission_ids)
            .await?;
        Ok(Json(permissions.into_iter().map(permission_response).collect()))
    }
}

fn role_response(model: role::Model) -> RoleResponse {
    RoleResponse {
        id: model.id,
        name: model.name,
    }
}

fn permission_response(model: permission::Model) -> PermissionResponse {
    PermissionResponse {
        id: model.id,
        name: model.name,
    }
}
