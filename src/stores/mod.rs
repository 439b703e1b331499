// Stores layer - Data access and repository pattern
pub mod credential_store;
pub mod inventory_store;
pub mod listing_store;
pub mod rbac_store;

pub use credential_store::{CreatedUser, CredentialStore, NewUser};
pub use inventory_store::{InventoryStore, NewBrokerage, NewProperty};
pub use listing_store::{Listing, ListingStore};
pub use rbac_store::{RbacStore, SyncReport};
