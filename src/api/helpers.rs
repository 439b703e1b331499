use poem::Request;

use crate::api::auth::BearerAuth;
use crate::coordinators::AuthCoordinator;
use crate::errors::ApiError;
use crate::errors::internal::ValidationError;
use crate::services::{ListQuery, PermissionGate};
use crate::stores::Listing;
use crate::types::dto::common::PaginationMeta;
use crate::types::internal::RequestContext;

/// Authenticate the bearer and apply the route's gate
///
/// Runs before the handler touches any data.
pub async fn gated_context(
    auth_coordinator: &AuthCoordinator,
    req: &Request,
    auth: &BearerAuth,
    gate: &PermissionGate,
) -> Result<RequestContext, ApiError> {
    let ctx = RequestContext::from_request(req);
    auth_coordinator
        .authenticate_and_authorize(ctx, Some(&auth.0.token), gate)
        .await
        .map_err(ApiError::from_internal_error)
}

/// Authenticate the bearer without a permission requirement
pub async fn authenticated_context(
    auth_coordinator: &AuthCoordinator,
    req: &Request,
    auth: &BearerAuth,
) -> Result<RequestContext, ApiError> {
    let ctx = RequestContext::from_request(req);
    auth_coordinator
        .authenticate(ctx, Some(&auth.0.token))
        .await
        .map_err(ApiError::from_internal_error)
}

/// Build a listing query from raw query-string parameters
///
/// Each `filter` is `column:value`.
pub fn list_query(
    search: Option<String>,
    filters: Vec<String>,
    created_from: Option<String>,
    created_to: Option<String>,
    page: Option<String>,
    limit: Option<String>,
) -> Result<ListQuery, ApiError> {
    let mut errors = ValidationError::default();
    let mut parsed = Vec::with_capacity(filters.len());
    for raw in filters {
        match raw.split_once(':') {
            Some((column, value)) if !column.trim().is_empty() => {
                parsed.push((column.trim().to_string(), value.trim().to_string()));
            }
            _ => errors.push("filter", format!("expected column:value, got '{}'", raw)),
        }
    }
    errors.into_result().map_err(ApiError::validation_failed)?;

    Ok(ListQuery {
        search,
        filters: parsed,
        created_from,
        created_to,
        page,
        limit,
    })
}

pub fn pagination<R>(listing: &Listing<R>) -> PaginationMeta {
    PaginationMeta {
        page: listing.page.page,
        limit: listing.page.limit,
        total: listing.total,
    }
}
