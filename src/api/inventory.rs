use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::api::auth::BearerAuth;
use crate::api::helpers;
use crate::coordinators::{AuthCoordinator, InventoryCoordinator};
use crate::errors::ApiError;
use crate::services::PermissionGate;
use crate::types::db::{brokerage, deal, property};
use crate::types::dto::inventory::{
    CreateBrokerageRequest, CreatePropertyRequest, CreatedBrokerageResponse,
};
use crate::types::dto::listing::{BrokerageRow, DealRow, PropertyRow};
use crate::types::internal::PermissionTag;

const PROPERTY_CREATE_GATE: PermissionGate =
    PermissionGate::any_of(&[PermissionTag::PROPERTY_CREATE]);
const BROKERAGE_CREATE_GATE: PermissionGate =
    PermissionGate::any_of(&[PermissionTag::BROKERAGE_CREATE]);

#[derive(Tags)]
enum InventoryTags {
    /// Creation of code-bearing business records
    Inventory,
}

/// Inventory write endpoints
pub struct InventoryApi {
    auth_coordinator: Arc<AuthCoordinator>,
    inventory_coordinator: Arc<InventoryCoordinator>,
}

impl InventoryApi {
    pub fn new(
        auth_coordinator: Arc<AuthCoordinator>,
        inventory_coordinator: Arc<InventoryCoordinator>,
    ) -> Self {
        Self {
            auth_coordinator,
            inventory_coordinator,
        }
    }
}

#[OpenApi]
impl InventoryApi {
    /// Create a property with a generated `PRP-` code
    #[oai(path = "/properties", method = "post", tag = "InventoryTags::Inventory")]
    async fn create_property(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<CreatePropertyRequest>,
    ) -> Result<Json<PropertyRow>, ApiError> {
        let ctx =
            helpers::gated_context(&self.auth_coordinator, req, &auth, &PROPERTY_CREATE_GATE).await?;
        let created = self.inventory_coordinator.create_property(&ctx, body.0).await?;
        Ok(Json(property_row(created)))
    }

    /// Create a brokerage with a generated `BRK-` code and its open deal
    #[oai(path = "/brokerages", method = "post", tag = "InventoryTags::Inventory")]
    async fn create_brokerage(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<CreateBrokerageRequest>,
    ) -> Result<Json<CreatedBrokerageResponse>, ApiError> {
        let ctx =
            helpers::gated_context(&self.auth_coordinator, req, &auth, &BROKERAGE_CREATE_GATE).await?;
        let (brokerage, deal) = self.inventory_coordinator.create_brokerage(&ctx, body.0).await?;
        Ok(Json(CreatedBrokerageResponse {
            brokerage: brokerage_row(brokerage),
            deal: deal_row(deal),
        }))
    }
}

fn property_row(model: property::Model) -> PropertyRow {
    PropertyRow {
        id: model.id,
        property_code: model.property_code,
        title: model.title,
        city: model.city,
        status: model.status,
        price: model.price,
        agent_code: model.agent_code,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn brokerage_row(model: brokerage::Model) -> BrokerageRow {
    BrokerageRow {
        id: model.id,
        brokerage_code: model.brokerage_code,
        property_code: model.property_code,
        client_name: model.client_name,
        amount: model.amount,
        status: model.status,
        agent_code: model.agent_code,
        created_at: model.created_at,
    }
}

fn deal_row(model: deal::Model) -> DealRow {
    DealRow {
        id: model.id,
        brokerage_code: model.brokerage_code,
        property_code: model.property_code,
        amount: model.amount,
        stage: model.stage,
        agent_code: model.agent_code,
        created_at: model.created_at,
    }
}
