// Internal types - value types shared across layers, never exposed over HTTP
pub mod auth;
pub mod code_prefix;
pub mod context;
pub mod entity_descriptor;
pub mod hierarchy_code;
pub mod permission_tag;
pub mod role_name;

pub use auth::Claims;
pub use code_prefix::CodePrefix;
pub use context::{Principal, RequestContext, RequestId, RequestSource};
pub use entity_descriptor::{
    EntityDescriptor, EntityKind, HierarchySource, JoinSpec, ListingOrder, ScopedRow,
};
pub use hierarchy_code::HierarchyCode;
pub use permission_tag::{Action, PermissionTag, Resource};
pub use role_name::RoleName;
