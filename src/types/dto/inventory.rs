use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for creating a property
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct CreatePropertyRequest {
    pub title: String,
    pub city: Option<String>,
    pub price: i64,

    /// Owning agent; ignored for agents, who always own what they create
    pub agent_code: Option<String>,
}

/// Request model for creating a brokerage and its derived deal
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct CreateBrokerageRequest {
    pub property_code: Option<String>,
    pub client_name: String,
    pub amount: i64,

    /// Owning agent; ignored for agents, who always own what they create
    pub agent_code: Option<String>,
}

/// A brokerage together with the deal opened for it
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreatedBrokerageResponse {
    pub brokerage: super::listing::BrokerageRow,
    pub deal: super::listing::DealRow,
}
