// Database entities - SeaORM models
pub mod agent;
pub mod brokerage;
pub mod deal;
pub mod estimate;
pub mod manager;
pub mod notification;
pub mod permission;
pub mod property;
pub mod role;
pub mod role_permission;
pub mod user;
pub mod user_role;
pub mod visit;
