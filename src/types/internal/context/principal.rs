use crate::types::internal::HierarchyCode;

/// The authenticated user behind a request
///
/// Built once per request by the auth coordinator from the token subject and
/// a fresh read of the user's roles.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub user_id: i32,
    pub email: String,

    /// Canonical role name as stored, `None` when the user holds no role
    pub role: Option<String>,

    /// The user's business code, which is also its hierarchy join key
    pub code: Option<HierarchyCode>,
}
