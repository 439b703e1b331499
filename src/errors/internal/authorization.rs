use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// Granted permissions do not intersect the route's required set
    #[error("Permission denied: requires one of [{}]", .required.join(", "))]
    PermissionDenied { required: Vec<String> },

    /// Role is outside the reporting hierarchy
    #[error("Unrecognized role: {0}")]
    UnrecognizedRole(String),

    #[error("User has no role assigned")]
    MissingRole,

    /// A scoped role without a hierarchy code cannot be mapped to a predicate
    #[error("Role {role} has no hierarchy code")]
    MissingHierarchyCode { role: String },

    /// Write target lies outside the requester's visibility scope
    #[error("Target outside scope: {target}")]
    OutOfScope { target: String },
}
