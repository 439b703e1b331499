use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Response model for health check endpoint
#[derive(Object, Debug)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,

    /// Timestamp of the health check (ISO 8601 format)
    pub timestamp: String,
}

/// Pagination metadata attached to every listing
#[derive(Object, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page, starting at 1
    pub page: u64,

    /// Page size actually applied
    pub limit: u64,

    /// Rows matching the scoped filters across all pages
    pub total: u64,
}

/// Generic acknowledgement for mutations without a body
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}
