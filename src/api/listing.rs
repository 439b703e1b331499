use std::sync::Arc;

use poem::Request;
use poem_openapi::{
    ApiResponse, OpenApi, Tags,
    param::{Path, Query},
    payload::{Binary, Json},
};

use crate::api::auth::BearerAuth;
use crate::api::helpers;
use crate::coordinators::{AuthCoordinator, ListingCoordinator};
use crate::errors::ApiError;
use crate::services::PermissionGate;
use crate::types::dto::common::PaginationMeta;
use crate::types::dto::dashboard::DashboardResponse;
use crate::types::dto::listing::{
    AgentPage, AgentRow, BrokeragePage, BrokerageRow, DealPage, DealRow, EstimatePage,
    EstimateRow, NotificationPage, NotificationRow, PropertyPage, PropertyRow, VisitPage, VisitRow,
};
use crate::types::internal::{PermissionTag, ScopedRow};

const PROPERTY_LIST_GATE: PermissionGate = PermissionGate::any_of(&[PermissionTag::PROPERTY_LIST]);
const PROPERTY_VIEW_GATE: PermissionGate =
    PermissionGate::any_of(&[PermissionTag::PROPERTY_VIEW, PermissionTag::PROPERTY_LIST]);
const PROPERTY_EXPORT_GATE: PermissionGate =
    PermissionGate::any_of(&[PermissionTag::PROPERTY_EXPORT]);
const BROKERAGE_LIST_GATE: PermissionGate =
    PermissionGate::any_of(&[PermissionTag::BROKERAGE_LIST]);
const ESTIMATE_LIST_GATE: PermissionGate = PermissionGate::any_of(&[PermissionTag::ESTIMATE_LIST]);
const VISIT_LIST_GATE: PermissionGate = PermissionGate::any_of(&[PermissionTag::VISIT_LIST]);
const DEAL_LIST_GATE: PermissionGate = PermissionGate::any_of(&[PermissionTag::DEAL_LIST]);
const NOTIFICATION_LIST_GATE: PermissionGate =
    PermissionGate::any_of(&[PermissionTag::NOTIFICATION_LIST]);
const AGENT_LIST_GATE: PermissionGate = PermissionGate::any_of(&[PermissionTag::USER_LIST]);
const DASHBOARD_GATE: PermissionGate = PermissionGate::any_of(&[PermissionTag::REPORT_VIEW]);

/// API tags for scoped listings
#[derive(Tags)]
enum ListingTags {
    /// Listings filtered to the caller's branch of the hierarchy
    Listings,
    /// Aggregates over the caller's visible rows
    Dashboard,
}

/// CSV download
#[derive(ApiResponse)]
pub enum ExportResponse {
    #[oai(status = 200, content_type = "text/csv")]
    Csv(
        Binary<Vec<u8>>,
        #[oai(header = "Content-Disposition")] String,
    ),
}

/// Scoped listing API endpoints
pub struct ListingApi {
    auth_coordinator: Arc<AuthCoordinator>,
    listing_coordinator: Arc<ListingCoordinator>,
}

impl ListingApi {
    pub fn new(
        auth_coordinator: Arc<AuthCoordinator>,
        listing_coordinator: Arc<ListingCoordinator>,
    ) -> Self {
        Self {
            auth_coordinator,
            listing_coordinator,
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn page<R: ScopedRow>(
        &self,
        req: &Request,
        auth: &BearerAuth,
        gate: &PermissionGate,
        search: Option<String>,
        filter: Vec<String>,
        created_from: Option<String>,
        created_to: Option<String>,
        page: Option<String>,
        limit: Option<String>,
    ) -> Result<(Vec<R>, PaginationMeta), ApiError> {
        let ctx = helpers::gated_context(&self.auth_coordinator, req, auth, gate).await?;
        let query = helpers::list_query(search, filter, created_from, created_to, page, limit)?;
        let listing = self.listing_coordinator.list::<R>(&ctx, &query).await?;
        let pagination = helpers::pagination(&listing);
        Ok((listing.rows, pagination))
    }
}

#[OpenApi]
impl ListingApi {
    /// List properties
    ///
    /// `filter` takes `column:value` pairs on status, city, agent_code or
    /// property_code. `search` matches code, title and city.
    #[allow(clippy::too_many_arguments)]
    #[oai(path = "/properties", method = "get", tag = "ListingTags::Listings")]
    async fn list_properties(
        &self,
        req: &Request,
        auth: BearerAuth,
        search: Query<Option<String>>,
        filter: Query<Vec<String>>,
        created_from: Query<Option<String>>,
        created_to: Query<Option<String>>,
        page: Query<Option<String>>,
        limit: Query<Option<String>>,
    ) -> Result<Json<PropertyPage>, ApiError> {
        let (data, pagination) = self
            .page::<PropertyRow>(
                req, &auth, &PROPERTY_LIST_GATE, search.0, filter.0, created_from.0,
                created_to.0, page.0, limit.0,
            )
            .await?;
        Ok(Json(PropertyPage { data, pagination }))
    }

    /// Export properties as CSV
    ///
    /// Same scope and filters as the listing, without pagination, newest first.
    #[oai(path = "/properties/export", method = "get", tag = "ListingTags::Listings")]
    async fn export_properties(
        &self,
        req: &Request,
        auth: BearerAuth,
        search: Query<Option<String>>,
        filter: Query<Vec<String>>,
        created_from: Query<Option<String>>,
        created_to: Query<Option<String>>,
    ) -> Result<ExportResponse, ApiError> {
        let ctx =
            helpers::gated_context(&self.auth_coordinator, req, &auth, &PROPERTY_EXPORT_GATE).await?;
        let query =
            helpers::list_query(search.0, filter.0, created_from.0, created_to.0, None, None)?;
        let csv = self.listing_coordinator.export_properties(&ctx, &query).await?;

        Ok(ExportResponse::Csv(
            Binary(csv),
            "attachment; filename=\"properties.csv\"".to_string(),
        ))
    }

    /// Get one property
    ///
    /// A property outside the caller's scope is reported as not found.
    #[oai(path = "/properties/:id", method = "get", tag = "ListingTags::Listings")]
    async fn get_property(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<i32>,
    ) -> Result<Json<PropertyRow>, ApiError> {
        let ctx =
            helpers::gated_context(&self.auth_coordinator, req, &auth, &PROPERTY_VIEW_GATE).await?;
        let row = self.listing_coordinator.find::<PropertyRow>(&ctx, id.0).await?;
        Ok(Json(row))
    }

    /// List brokerages
    #[allow(clippy::too_many_arguments)]
    #[oai(path = "/brokerages", method = "get", tag = "ListingTags::Listings")]
    async fn list_brokerages(
        &self,
        req: &Request,
        auth: BearerAuth,
        search: Query<Option<String>>,
        filter: Query<Vec<String>>,
        created_from: Query<Option<String>>,
        created_to: Query<Option<String>>,
        page: Query<Option<String>>,
        limit: Query<Option<String>>,
    ) -> Result<Json<BrokeragePage>, ApiError> {
        let (data, pagination) = self
            .page::<BrokerageRow>(
                req, &auth, &BROKERAGE_LIST_GATE, search.0, filter.0, created_from.0,
                created_to.0, page.0, limit.0,
            )
            .await?;
        Ok(Json(BrokeragePage { data, pagination }))
    }

    /// List estimates
    #[allow(clippy::too_many_arguments)]
    #[oai(path = "/estimates", method = "get", tag = "ListingTags::Listings")]
    async fn list_estimates(
        &self,
        req: &Request,
        auth: BearerAuth,
        search: Query<Option<String>>,
        filter: Query<Vec<String>>,
        created_from: Query<Option<String>>,
        created_to: Query<Option<String>>,
        page: Query<Option<String>>,
        limit: Query<Option<String>>,
    ) -> Result<Json<EstimatePage>, ApiError> {
        let (data, pagination) = self
            .page::<EstimateRow>(
                req, &auth, &ESTIMATE_LIST_GATE, search.0, filter.0, created_from.0,
                created_to.0, page.0, limit.0,
            )
            .await?;
        Ok(Json(EstimatePage { data, pagination }))
    }

    /// List visits
    #[allow(clippy::too_many_arguments)]
    #[oai(path = "/visits", method = "get", tag = "ListingTags::Listings")]
    async fn list_visits(
        &self,
        req: &Request,
        auth: BearerAuth,
        search: Query<Option<String>>,
        filter: Query<Vec<String>>,
        created_from: Query<Option<String>>,
        created_to: Query<Option<String>>,
        page: Query<Option<String>>,
        limit: Query<Option<String>>,
    ) -> Result<Json<VisitPage>, ApiError> {
        let (data, pagination) = self
            .page::<VisitRow>(
                req, &auth, &VISIT_LIST_GATE, search.0, filter.0, created_from.0,
                created_to.0, page.0, limit.0,
            )
            .await?;
        Ok(Json(VisitPage { data, pagination }))
    }

    /// List deals
    #[allow(clippy::too_many_arguments)]
    #[oai(path = "/deals", method = "get", tag = "ListingTags::Listings")]
    async fn list_deals(
        &self,
        req: &Request,
        auth: BearerAuth,
        search: Query<Option<String>>,
        filter: Query<Vec<String>>,
        created_from: Query<Option<String>>,
        created_to: Query<Option<String>>,
        page: Query<Option<String>>,
        limit: Query<Option<String>>,
    ) -> Result<Json<DealPage>, ApiError> {
        let (data, pagination) = self
            .page::<DealRow>(
                req, &auth, &DEAL_LIST_GATE, search.0, filter.0, created_from.0,
                created_to.0, page.0, limit.0,
            )
            .await?;
        Ok(Json(DealPage { data, pagination }))
    }

    /// List notifications, newest first
    #[allow(clippy::too_many_arguments)]
    #[oai(path = "/notifications", method = "get", tag = "ListingTags::Listings")]
    async fn list_notifications(
        &self,
        req: &Request,
        auth: BearerAuth,
        search: Query<Option<String>>,
        filter: Query<Vec<String>>,
        created_from: Query<Option<String>>,
        created_to: Query<Option<String>>,
        page: Query<Option<String>>,
        limit: Query<Option<String>>,
    ) -> Result<Json<NotificationPage>, ApiError> {
        let (data, pagination) = self
            .page::<NotificationRow>(
                req, &auth, &NOTIFICATION_LIST_GATE, search.0, filter.0, created_from.0,
                created_to.0, page.0, limit.0,
            )
            .await?;
        Ok(Json(NotificationPage { data, pagination }))
    }

    /// List agents with their user details
    #[allow(clippy::too_many_arguments)]
    #[oai(path = "/agents", method = "get", tag = "ListingTags::Listings")]
    async fn list_agents(
        &self,
        req: &Request,
        auth: BearerAuth,
        search: Query<Option<String>>,
        filter: Query<Vec<String>>,
        created_from: Query<Option<String>>,
        created_to: Query<Option<String>>,
        page: Query<Option<String>>,
        limit: Query<Option<String>>,
    ) -> Result<Json<AgentPage>, ApiError> {
        let (data, pagination) = self
            .page::<AgentRow>(
                req, &auth, &AGENT_LIST_GATE, search.0, filter.0, created_from.0,
                created_to.0, page.0, limit.0,
            )
            .await?;
        Ok(Json(AgentPage { data, pagination }))
    }

    /// Visible row counts per entity
    #[oai(path = "/dashboard", method = "get", tag = "ListingTags::Dashboard")]
    async fn dashboard(
        &self,
        req: &Request,
        auth: BearerAuth,
    ) -> Result<Json<DashboardResponse>, ApiError> {
        let ctx = helpers::gated_context(&self.auth_coordinator, req, &auth, &DASHBOARD_GATE).await?;
        Ok(Json(self.listing_coordinator.dashboard(&ctx).await?))
    }
}
