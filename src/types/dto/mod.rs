// Request and response models exposed over HTTP
pub mod auth;
pub mod common;
pub mod dashboard;
pub mod inventory;
pub mod listing;
pub mod rbac;
pub mod user;
