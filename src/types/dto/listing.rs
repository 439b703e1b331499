use poem_openapi::Object;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::types::{
    dto::common::PaginationMeta,
    internal::{EntityKind, ScopedRow},
};

#[derive(Object, FromQueryResult, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRow {
    pub id: i32,
    pub property_code: String,
    pub title: String,
    pub city: Option<String>,
    pub status: String,
    pub price: i64,
    pub agent_code: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ScopedRow for PropertyRow {
    const KIND: EntityKind = EntityKind::Property;
}

#[derive(Object, FromQueryResult, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerageRow {
    pub id: i32,
    pub brokerage_code: String,
    pub property_code: Option<String>,
    pub client_name: String,
    pub amount: i64,
    pub status: String,
    pub agent_code: Option<String>,
    pub created_at: i64,
}

impl ScopedRow for BrokerageRow {
    const KIND: EntityKind = EntityKind::Brokerage;
}

#[derive(Object, FromQueryResult, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRow {
    pub id: i32,
    pub property_code: Option<String>,
    pub client_name: String,
    pub amount: i64,
    pub status: String,
    pub agent_code: Option<String>,
    pub created_at: i64,
}

impl ScopedRow for EstimateRow {
    const KIND: EntityKind = EntityKind::Estimate;
}

#[derive(Object, FromQueryResult, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRow {
    pub id: i32,
    pub property_code: Option<String>,
    pub visitor_name: String,
    pub visit_at: i64,
    pub status: String,
    pub agent_code: Option<String>,
    pub created_at: i64,
}

impl ScopedRow for VisitRow {
    const KIND: EntityKind = EntityKind::Visit;
}

#[derive(Object, FromQueryResult, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealRow {
    pub id: i32,
    pub brokerage_code: Option<String>,
    pub property_code: Option<String>,
    pub amount: i64,
    pub stage: String,
    pub agent_code: Option<String>,
    pub created_at: i64,
}

impl ScopedRow for DealRow {
    const KIND: EntityKind = EntityKind::Deal;
}

#[derive(Object, FromQueryResult, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRow {
    pub id: i32,
    pub title: String,
    pub message: String,
    pub agent_code: Option<String>,
    pub created_by: Option<i32>,
    pub is_read: bool,
    pub created_at: i64,
}

impl ScopedRow for NotificationRow {
    const KIND: EntityKind = EntityKind::Notification;
}

/// Agent listing row, joined with the agent's user record
#[derive(Object, FromQueryResult, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRow {
    pub user_id: i32,
    pub agent_code: String,
    pub manager_code: Option<String>,
    pub admin_code: Option<String>,
    pub commission_bps: i32,
    pub overdraft: i64,
    pub balance: i64,
    pub created_at: i64,
    pub name: String,
    pub email: String,
}

impl ScopedRow for AgentRow {
    const KIND: EntityKind = EntityKind::Agent;
}

#[derive(Object, Debug)]
pub struct PropertyPage {
    pub data: Vec<PropertyRow>,
    pub pagination: PaginationMeta,
}

#[derive(Object, Debug)]
pub struct BrokeragePage {
    pub data: Vec<BrokerageRow>,
    pub pagination: PaginationMeta,
}

#[derive(Object, Debug)]
pub struct EstimatePage {
    pub data: Vec<EstimateRow>,
    pub pagination: PaginationMeta,
}

#[derive(Object, Debug)]
pub struct VisitPage {
    pub data: Vec<VisitRow>,
    pub pagination: PaginationMeta,
}

#[derive(Object, Debug)]
pub struct DealPage {
    pub data: Vec<DealRow>,
    pub pagination: PaginationMeta,
}

#[derive(Object, Debug)]
pub struct NotificationPage {
    pub data: Vec<NotificationRow>,
    pub pagination: PaginationMeta,
}

#[derive(Object, Debug)]
pub struct AgentPage {
    pub data: Vec<AgentRow>,
    pub pagination: PaginationMeta,
}
