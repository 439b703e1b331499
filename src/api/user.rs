use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, Tags, param::Path, payload::Json};

use crate::api::auth::BearerAuth;
use crate::api::helpers;
use crate::coordinators::{AuthCoordinator, UserCoordinator};
use crate::errors::ApiError;
use crate::services::PermissionGate;
use crate::types::dto::common::SuccessResponse;
use crate::types::dto::user::{CreateUserRequest, CreatedUserResponse};
use crate::types::internal::PermissionTag;

const USER_CREATE_GATE: PermissionGate = PermissionGate::any_of(&[PermissionTag::USER_CREATE]);
const USER_DELETE_GATE: PermissionGate = PermissionGate::any_of(&[PermissionTag::USER_DELETE]);

#[derive(Tags)]
enum UserTags {
    /// User lifecycle
    Users,
}

/// User lifecycle endpoints
pub struct UserApi {
    auth_coordinator: Arc<AuthCoordinator>,
    user_coordinator: Arc<UserCoordinator>,
}

impl UserApi {
    pub fn new(auth_coordinator: Arc<AuthCoordinator>, user_coordinator: Arc<UserCoordinator>) -> Self {
        Self {
            auth_coordinator,
            user_coordinator,
        }
    }
}

#[OpenApi]
impl UserApi {
    /// Create a user
    ///
    /// Assigns the role, generates the business code and creates the agent or
    /// manager record in one transaction.
    #[oai(path = "/users", method = "post", tag = "UserTags::Users")]
    async fn create_user(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<CreateUserRequest>,
    ) -> Result<Json<CreatedUserResponse>, ApiError> {
        let ctx = helpers::gated_context(&self.auth_coordinator, req, &auth, &USER_CREATE_GATE).await?;
        let created = self.user_coordinator.create_user(&ctx, body.0).await?;

        Ok(Json(CreatedUserResponse {
            id: created.user.id,
            name: created.user.name,
            email: created.user.email,
            code: created.user.code,
            role: created.role.name,
        }))
    }

    /// Delete a user
    ///
    /// Deleting a manager also deletes the agents that report to it.
    #[oai(path = "/users/:id", method = "delete", tag = "UserTags::Users")]
    async fn delete_user(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<i32>,
    ) -> Result<Json<SuccessResponse>, ApiError> {
        let ctx = helpers::gated_context(&self.auth_coordinator, req, &auth, &USER_DELETE_GATE).await?;
        let deleted = self.user_coordinator.delete_user(&ctx, id.0).await?;

        Ok(Json(SuccessResponse {
            success: true,
            message: format!("Deleted {} user(s)", deleted.len()),
        }))
    }
}
