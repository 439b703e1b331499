use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for creating a user
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,

    /// Role to assign; decides the code prefix and the sub-record
    pub role_id: i32,

    /// Manager the new agent reports to
    pub manager_code: Option<String>,

    /// Admin the new manager or agent reports to
    pub admin_code: Option<String>,

    /// Agent commission in basis points
    pub commission_bps: Option<i32>,
}

/// Response model for a created user
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreatedUserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,

    /// Generated business code
    pub code: String,
    pub role: String,
}
