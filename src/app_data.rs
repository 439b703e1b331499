use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::{BootstrapSettings, SecretManager};
use crate::services::{CodeGenerator, PasswordHasher, TokenService};
use crate::stores::{CredentialStore, InventoryStore, ListingStore, RbacStore};

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once in main.rs and shared across coordinators.
///
/// ```text
/// main.rs
///   ↓
/// AppData::init()
///   ↓ creates once
///   ├─ db (DatabaseConnection)
///   ├─ token_service (Arc<TokenService>)
///   ├─ rbac_store (Arc<RbacStore>)
///   ├─ credential_store (Arc<CredentialStore>)
///   ├─ listing_store (Arc<ListingStore>)
///   └─ inventory_store (Arc<InventoryStore>)
///   ↓ wrapped in Arc<AppData>
///   ↓ passed to coordinators
///   ├─ AuthCoordinator::new(app_data)
///   ├─ ListingCoordinator::new(app_data)
///   └─ ...
/// ```
pub struct AppData {
    pub db: DatabaseConnection,
    pub token_service: Arc<TokenService>,
    pub rbac_store: Arc<RbacStore>,
    pub credential_store: Arc<CredentialStore>,
    pub listing_store: Arc<ListingStore>,
    pub inventory_store: Arc<InventoryStore>,
}

impl AppData {
    /// Initialize all application data
    ///
    /// The database should be connected and migrated before calling this.
    pub fn init(
        db: DatabaseConnection,
        settings: &BootstrapSettings,
        secrets: &SecretManager,
    ) -> Self {
        tracing::info!("Initializing AppData...");
        let app_data = Self::build(
            db,
            secrets.jwt_secret().to_string(),
            secrets.password_pepper().to_string(),
            settings.jwt_expiration_minutes(),
            CodeGenerator::random(),
        );
        tracing::info!("AppData initialization complete");
        app_data
    }

    /// Assemble stores and services from explicit parts
    ///
    /// Tests use this to inject a deterministic code generator.
    pub fn build(
        db: DatabaseConnection,
        jwt_secret: String,
        password_pepper: String,
        jwt_expiration_minutes: i64,
        codes: CodeGenerator,
    ) -> Self {
        tracing::debug!("Creating stores...");
        let hasher = Arc::new(PasswordHasher::new(password_pepper));

        Self {
            db,
            token_service: Arc::new(TokenService::new(jwt_secret, jwt_expiration_minutes)),
            rbac_store: Arc::new(RbacStore::new()),
            credential_store: Arc::new(CredentialStore::new(hasher, codes.clone())),
            listing_store: Arc::new(ListingStore::new()),
            inventory_store: Arc::new(InventoryStore::new(codes)),
        }
    }
}
