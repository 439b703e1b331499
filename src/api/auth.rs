use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, SecurityScheme, Tags, auth::Bearer, payload::Json};

use crate::api::helpers;
use crate::coordinators::AuthCoordinator;
use crate::errors::ApiError;
use crate::types::dto::auth::{LoginRequest, TokenResponse, WhoAmIResponse};
use crate::types::internal::RequestContext;

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(ty = "bearer", bearer_format = "JWT")]
pub struct BearerAuth(pub Bearer);

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

/// Authentication API endpoints
pub struct AuthApi {
    auth_coordinator: Arc<AuthCoordinator>,
}

impl AuthApi {
    pub fn new(auth_coordinator: Arc<AuthCoordinator>) -> Self {
        Self { auth_coordinator }
    }
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Authenticate with email and password
    ///
    /// Returns a JWT access token for subsequent API requests.
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(
        &self,
        req: &Request,
        body: Json<LoginRequest>,
    ) -> Result<Json<TokenResponse>, ApiError> {
        let ctx = RequestContext::from_request(req);
        let (access_token, expires_in) = self
            .auth_coordinator
            .login(&ctx, &body.email, &body.password)
            .await?;

        Ok(Json(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }))
    }

    /// Get current user information
    ///
    /// Returns the caller's id, email, canonical role and business code.
    #[oai(path = "/whoami", method = "get", tag = "AuthTags::Authentication")]
    async fn whoami(
        &self,
        req: &Request,
        auth: BearerAuth,
    ) -> Result<Json<WhoAmIResponse>, ApiError> {
        let ctx = helpers::authenticated_context(&self.auth_coordinator, req, &auth).await?;
        let principal = ctx.require_principal()?;

        Ok(Json(WhoAmIResponse {
            user_id: principal.user_id,
            email: principal.email.clone(),
            role: principal.role.clone(),
            code: principal.code.as_ref().map(|c| c.as_str().to_string()),
        }))
    }
}
