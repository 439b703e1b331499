use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::AppData;
use crate::coordinators::auth_coordinator::principal_scope;
use crate::errors::InternalError;
use crate::services::{CsvExporter, ListQuery};
use crate::stores::{Listing, ListingStore};
use crate::types::dto::dashboard::DashboardResponse;
use crate::types::dto::listing::PropertyRow;
use crate::types::internal::{EntityKind, RequestContext, ScopedRow};

/// Scoped reads: listings, single lookups, export and dashboard counts
///
/// The caller's visibility scope is resolved before any statement runs; a
/// caller without a scope gets an authorization failure and no rows.
pub struct ListingCoordinator {
    db: DatabaseConnection,
    listing_store: Arc<ListingStore>,
    exporter: CsvExporter,
}

impl ListingCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            listing_store: Arc::clone(&app_data.listing_store),
            exporter: CsvExporter,
        }
    }

    pub async fn list<R: ScopedRow>(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> Result<Listing<R>, InternalError> {
        let scope = principal_scope(ctx)?;
        self.listing_store.list::<R>(&self.db, &scope, query).await
    }

    /// Find one visible row; hidden and missing rows are both NotFound
    pub async fn find<R: ScopedRow>(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<R, InternalError> {
        let scope = principal_scope(ctx)?;
        self.listing_store
            .find_one::<R>(&self.db, &scope, id)
            .await?
            .ok_or_else(|| InternalError::not_found(R::KIND.as_str(), id))
    }

    /// Render the visible, filtered properties as CSV
    pub async fn export_properties(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> Result<Vec<u8>, InternalError> {
        let scope = principal_scope(ctx)?;
        let rows = self
            .listing_store
            .export::<PropertyRow>(&self.db, &scope, query)
            .await?;

        tracing::info!(
            "Exporting {} properties (request {})",
            rows.len(),
            ctx.request_id
        );
        self.exporter.render(&rows)
    }

    /// Visible row counts per entity
    pub async fn dashboard(&self, ctx: &RequestContext) -> Result<DashboardResponse, InternalError> {
        let scope = principal_scope(ctx)?;
        let mut response = DashboardResponse::default();

        for kind in EntityKind::ALL {
            let total = self
                .listing_store
                .count(&self.db, kind.descriptor(), &scope)
                .await?;
            match kind {
                EntityKind::Property => response.properties = total,
                EntityKind::Brokerage => response.brokerages = total,
                EntityKind::Estimate => response.estimates = total,
                EntityKind::Visit => response.visits = total,
                EntityKind::Deal => response.deals = total,
                EntityKind::Notification => response.notifications = total,
                EntityKind::Agent => response.agents = total,
            }
        }

        Ok(response)
    }
}
