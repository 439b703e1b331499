// Coordinators layer - Workflow orchestration
//
// Coordinators compose store and service operations for specific API
// endpoints. Each one resolves the caller's scope before touching data.

pub mod auth_coordinator;
pub mod inventory_coordinator;
pub mod listing_coordinator;
pub mod rbac_coordinator;
pub mod user_coordinator;

pub use auth_coordinator::{AuthCoordinator, principal_scope};
pub use inventory_coordinator::InventoryCoordinator;
pub use listing_coordinator::ListingCoordinator;
pub use rbac_coordinator::RbacCoordinator;
pub use user_coordinator::UserCoordinator;
