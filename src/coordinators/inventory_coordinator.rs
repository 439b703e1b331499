use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::AppData;
use crate::coordinators::auth_coordinator::principal_scope;
use crate::errors::InternalError;
use crate::errors::internal::AuthorizationError;
use crate::services::{ListQuery, VisibilityScope};
use crate::stores::{InventoryStore, ListingStore, NewBrokerage, NewProperty};
use crate::types::db::{brokerage, deal, property};
use crate::types::dto::inventory::{CreateBrokerageRequest, CreatePropertyRequest};
use crate::types::internal::{EntityKind, HierarchyCode, RequestContext};

/// Property and brokerage creation on behalf of an owning agent
pub struct InventoryCoordinator {
    db: DatabaseConnection,
    inventory_store: Arc<InventoryStore>,
    listing_store: Arc<ListingStore>,
}

impl InventoryCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            inventory_store: Arc::clone(&app_data.inventory_store),
            listing_store: Arc::clone(&app_data.listing_store),
        }
    }

    pub async fn create_property(
        &self,
        ctx: &RequestContext,
        request: CreatePropertyRequest,
    ) -> Result<property::Model, InternalError> {
        let agent_code = self
            .owning_agent(ctx, request.agent_code.as_deref())
            .await?;

        self.inventory_store
            .create_property(
                &self.db,
                NewProperty {
                    title: request.title,
                    city: request.city.filter(|c| !c.trim().is_empty()),
                    price: request.price,
                    agent_code,
                },
            )
            .await
    }

    pub async fn create_brokerage(
        &self,
        ctx: &RequestContext,
        request: CreateBrokerageRequest,
    ) -> Result<(brokerage::Model, deal::Model), InternalError> {
        let agent_code = self
            .owning_agent(ctx, request.agent_code.as_deref())
            .await?;
        let scope = principal_scope(ctx)?;

        self.inventory_store
            .create_brokerage(
                &self.db,
                &scope,
                NewBrokerage {
                    property_code: request.property_code.filter(|c| !c.trim().is_empty()),
                    client_name: request.client_name,
                    amount: request.amount,
                    agent_code,
                },
            )
            .await
    }

    /// The agent a new row belongs to
    ///
    /// Agents always own what they create. Every other role must name an
    /// existing agent inside its own scope.
    async fn owning_agent(
        &self,
        ctx: &RequestContext,
        requested: Option<&str>,
    ) -> Result<String, InternalError> {
        let scope = principal_scope(ctx)?;

        if let VisibilityScope::Agent(own) = &scope {
            return Ok(own.as_str().to_string());
        }

        let code = requested
            .and_then(HierarchyCode::parse)
            .ok_or_else(|| InternalError::validation("agent_code", "an owning agent is required"))?;

        let query = ListQuery::default().with_filter("agent_code", code.as_str());
        let visible = self
            .listing_store
            .count_matching(&self.db, EntityKind::Agent.descriptor(), &scope, &query)
            .await?;

        if visible == 0 {
            tracing::warn!(
                "Agent {} is outside the caller's scope (request {})",
                code,
                ctx.request_id
            );
            return Err(AuthorizationError::OutOfScope {
                target: code.into(),
            }
            .into());
        }

        Ok(code.into())
    }
}
