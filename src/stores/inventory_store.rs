use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};

use crate::errors::InternalError;
use crate::errors::internal::{AuthorizationError, ValidationError};
use crate::services::code_generator::retry_on_code_collision;
use crate::services::{CodeGenerator, ListQuery, VisibilityScope};
use crate::stores::ListingStore;
use crate::types::db::{brokerage, deal, property};
use crate::types::internal::{CodePrefix, EntityKind};

pub const PROPERTY_STATUS_AVAILABLE: &str = "available";
pub const BROKERAGE_STATUS_OPEN: &str = "open";
pub const DEAL_STAGE_OPEN: &str = "open";

/// Input for `InventoryStore::create_property`, with the owning agent resolved
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub title: String,
    pub city: Option<String>,
    pub price: i64,
    pub agent_code: String,
}

/// Input for `InventoryStore::create_brokerage`, with the owning agent resolved
#[derive(Debug, Clone)]
pub struct NewBrokerage {
    pub property_code: Option<String>,
    pub client_name: String,
    pub amount: i64,
    pub agent_code: String,
}

/// InventoryStore writes code-bearing business rows
pub struct InventoryStore {
    codes: CodeGenerator,
}

impl InventoryStore {
    pub fn new(codes: CodeGenerator) -> Self {
        Self { codes }
    }

    /// Create a property with a generated `PRP-` code
    pub async fn create_property(
        &self,
        db: &DatabaseConnection,
        input: NewProperty,
    ) -> Result<property::Model, InternalError> {
        let mut errors = ValidationError::default();
        if input.title.trim().is_empty() {
            errors.push("title", "must not be empty");
        }
        if input.price < 0 {
            errors.push("price", "must not be negative");
        }
        errors.into_result()?;

        let (codes, fields) = (&self.codes, &input);
        let created = retry_on_code_collision(CodePrefix::Property, move || async move {
            let txn = db.begin().await.map_err(InternalError::transaction_begin)?;
            let code = codes.generate(&txn, CodePrefix::Property).await?;
            let now = Utc::now().timestamp();

            let property = property::ActiveModel {
                property_code: Set(code),
                title: Set(fields.title.trim().to_string()),
                city: Set(fields.city.clone()),
                status: Set(PROPERTY_STATUS_AVAILABLE.to_string()),
                price: Set(fields.price),
                agent_code: Set(Some(fields.agent_code.clone())),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| InternalError::database("create_property", e))?;

            txn.commit().await.map_err(InternalError::transaction_commit)?;
            Ok(property)
        })
        .await?;

        tracing::info!(
            "Created property {} for {}",
            created.property_code,
            input.agent_code
        );
        Ok(created)
    }

    /// Create a brokerage with a generated `BRK-` code and its open deal
    ///
    /// Both rows are written in one transaction; the deal copies the
    /// brokerage's agent, property and amount. A property code must name an
    /// existing property visible under `scope`.
    ///
    /// # Returns
    /// * `Err(InternalError::Validation)` - Bad input or unknown property code
    /// * `Err(AuthorizationError::OutOfScope)` - Property outside `scope`
    pub async fn create_brokerage(
        &self,
        db: &DatabaseConnection,
        scope: &VisibilityScope,
        input: NewBrokerage,
    ) -> Result<(brokerage::Model, deal::Model), InternalError> {
        let mut errors = ValidationError::default();
        if input.client_name.trim().is_empty() {
            errors.push("client_name", "must not be empty");
        }
        if input.amount < 0 {
            errors.push("amount", "must not be negative");
        }
        errors.into_result()?;

        let (codes, fields) = (&self.codes, &input);
        let (brokerage, deal) = retry_on_code_collision(CodePrefix::Brokerage, move || async move {
            let txn = db.begin().await.map_err(InternalError::transaction_begin)?;
            if let Some(property_code) = fields.property_code.as_deref() {
                Self::check_property(&txn, scope, property_code).await?;
            }
            let code = codes.generate(&txn, CodePrefix::Brokerage).await?;
            let now = Utc::now().timestamp();

            let brokerage = brokerage::ActiveModel {
                brokerage_code: Set(code.clone()),
                property_code: Set(fields.property_code.clone()),
                client_name: Set(fields.client_name.trim().to_string()),
                amount: Set(fields.amount),
                status: Set(BROKERAGE_STATUS_OPEN.to_string()),
                agent_code: Set(Some(fields.agent_code.clone())),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| InternalError::database("create_brokerage", e))?;

            let deal = deal::ActiveModel {
                brokerage_code: Set(Some(code)),
                property_code: Set(fields.property_code.clone()),
                amount: Set(fields.amount),
                stage: Set(DEAL_STAGE_OPEN.to_string()),
                agent_code: Set(Some(fields.agent_code.clone())),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| InternalError::database("create_brokerage_deal", e))?;

            txn.commit().await.map_err(InternalError::transaction_commit)?;
            Ok((brokerage, deal))
        })
        .await?;

        tracing::info!(
            "Created brokerage {} with deal {} for {}",
            brokerage.brokerage_code,
            deal.id,
            input.agent_code
        );
        Ok((brokerage, deal))
    }

    /// The property must exist and be visible under `scope`
    async fn check_property(
        conn: &impl ConnectionTrait,
        scope: &VisibilityScope,
        property_code: &str,
    ) -> Result<(), InternalError> {
        let exists = property::Entity::find()
            .filter(property::Column::PropertyCode.eq(property_code))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("create_brokerage_find_property", e))?
            .is_some();
        if !exists {
            return Err(InternalError::validation("property_code", "unknown property"));
        }

        if scope.is_unrestricted() {
            return Ok(());
        }
        let query = ListQuery::default().with_filter("property_code", property_code);
        let visible = ListingStore::new()
            .count_matching(conn, EntityKind::Property.descriptor(), scope, &query)
            .await?;
        if visible == 0 {
            tracing::warn!("Property {} is outside the caller's scope", property_code);
            return Err(AuthorizationError::OutOfScope {
                target: property_code.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
