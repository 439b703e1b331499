use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Row counts visible to the caller, per entity
#[derive(Object, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub properties: u64,
    pub brokerages: u64,
    pub estimates: u64,
    pub visits: u64,
    pub deals: u64,
    pub notifications: u64,
    pub agents: u64,
}
