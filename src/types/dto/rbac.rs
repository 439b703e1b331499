use poem_openapi::Object;
use serde::{Deserialize, Serialize};

#[derive(Object, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleResponse {
    pub id: i32,
    pub name: String,
}

#[derive(Object, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionResponse {
    pub id: i32,
    pub name: String,
}

/// A role together with its granted permissions
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RoleWithPermissions {
    pub id: i32,
    pub name: String,
    pub permissions: Vec<PermissionResponse>,
}

/// Complete desired role set for a user; replaces the current one
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct AssignRolesRequest {
    pub role_ids: Vec<i32>,
}

/// Complete desired permission set for a role; replaces the current one
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ReplacePermissionsRequest {
    pub permission_ids: Vec<i32>,
}

/// Effective roles and permissions of the caller
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct MyPermissionsResponse {
    pub roles: Vec<RoleResponse>,
    pub permissions: Vec<String>,
}
