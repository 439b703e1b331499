use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::AppData;
use crate::errors::InternalError;
use crate::errors::internal::AuthenticationError;
use crate::services::{PermissionGate, TokenService, VisibilityScope};
use crate::stores::{CredentialStore, RbacStore};
use crate::types::internal::{HierarchyCode, Principal, RequestContext};

/// Login, token-to-principal resolution and permission checks
pub struct AuthCoordinator {
    db: DatabaseConnection,
    token_service: Arc<TokenService>,
    credential_store: Arc<CredentialStore>,
    rbac_store: Arc<RbacStore>,
}

impl AuthCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            token_service: Arc::clone(&app_data.token_service),
            credential_store: Arc::clone(&app_data.credential_store),
            rbac_store: Arc::clone(&app_data.rbac_store),
        }
    }

    /// Verify credentials and issue an access token
    ///
    /// # Returns
    /// * `Ok((token, expires_in))` - Signed JWT and its lifetime in seconds
    /// * `Err(AuthenticationError::InvalidCredentials)` - Unknown email or wrong password
    pub async fn login(
        &self,
        ctx: &RequestContext,
        email: &str,
        password: &str,
    ) -> Result<(String, i64), InternalError> {
        let user = match self
            .credential_store
            .verify_credentials(&self.db, email, password)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Login failed (request {}): {}", ctx.request_id, e);
                return Err(e);
            }
        };

        let issued = self.token_service.generate_jwt(user.id)?;
        tracing::info!("User {} logged in (request {})", user.id, ctx.request_id);
        Ok(issued)
    }

    /// Resolve a bearer token into a context carrying the principal
    ///
    /// The user, roles and code are read fresh on every request, so role
    /// changes apply immediately.
    pub async fn authenticate(
        &self,
        ctx: RequestContext,
        token: Option<&str>,
    ) -> Result<RequestContext, InternalError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthenticationError::MissingToken)?;

        let user_id = self.token_service.validate_jwt(token)?;
        let user = self
            .credential_store
            .find_user(&self.db, user_id)
            .await?
            .ok_or(AuthenticationError::UserNotFound { user_id })?;

        // Canonical role is the lowest-id assignment; resolve_roles orders by id
        let role = self
            .rbac_store
            .resolve_roles(&self.db, user.id)
            .await
            .into_iter()
            .next()
            .map(|r| r.name);

        tracing::debug!(
            "Authenticated user {} as {:?} (request {})",
            user.id,
            role,
            ctx.request_id
        );

        Ok(ctx.with_principal(Principal {
            user_id: user.id,
            email: user.email,
            role,
            code: HierarchyCode::parse(&user.code),
        }))
    }

    /// Check the principal's current permissions against a gate
    pub async fn authorize<'a>(
        &self,
        ctx: &'a RequestContext,
        gate: &PermissionGate,
    ) -> Result<&'a Principal, InternalError> {
        let principal = ctx.require_principal()?;
        gate.authorize(&self.db, &self.rbac_store, principal.user_id).await?;
        Ok(principal)
    }

    /// Authenticate, then apply the gate
    pub async fn authenticate_and_authorize(
        &self,
        ctx: RequestContext,
        token: Option<&str>,
        gate: &PermissionGate,
    ) -> Result<RequestContext, InternalError> {
        let ctx = self.authenticate(ctx, token).await?;
        self.authorize(&ctx, gate).await?;
        Ok(ctx)
    }
}

/// Visibility scope of the authenticated principal
pub fn principal_scope(ctx: &RequestContext) -> Result<VisibilityScope, InternalError> {
    let principal = ctx.require_principal()?;
    VisibilityScope::for_role(principal.role.as_deref(), principal.code.as_ref()).map_err(|e| {
        tracing::warn!(
            "User {} has no visibility scope (request {}): {}",
            principal.user_id,
            ctx.request_id,
            e
        );
        InternalError::from(e)
    })
}
