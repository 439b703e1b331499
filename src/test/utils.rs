// Test utilities shared across unit tests
// Only compiled when running tests

use std::sync::Arc;

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

use crate::services::{CodeGenerator, PasswordHasher};
use crate::stores::credential_store::NewUser;
use crate::stores::{CredentialStore, RbacStore};
use crate::types::db::{brokerage, deal, notification, property};

pub const TEST_PASSWORD: &str = "password123";

/// Creates an in-memory database with every migration applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Creates a migrated database with the role and permission vocabulary synced
///
/// Roles get ids 1..4 in hierarchy order: Super Admin, Admin, Manager, Agent.
pub async fn setup_synced_db() -> DatabaseConnection {
    let db = setup_test_db().await;
    RbacStore::new()
        .sync_vocabulary(&db)
        .await
        .expect("Failed to sync vocabulary");
    db
}

pub fn test_credential_store() -> CredentialStore {
    CredentialStore::new(
        Arc::new(PasswordHasher::new("test-pepper-for-unit-tests".to_string())),
        CodeGenerator::random(),
    )
}

/// A valid user with the standard test password
pub fn new_user(email: &str, role_id: i32) -> NewUser {
    NewUser {
        name: email.split('@').next().unwrap_or("user").to_string(),
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
        phone: None,
        role_id,
        manager_code: None,
        admin_code: None,
        commission_bps: None,
    }
}

pub async fn insert_property(
    db: &DatabaseConnection,
    code: &str,
    title: &str,
    agent_code: Option<&str>,
) -> property::Model {
    let now = Utc::now().timestamp();
    property::ActiveModel {
        property_code: Set(code.to_string()),
        title: Set(title.to_string()),
        city: Set(Some("Lahore".to_string())),
        status: Set("available".to_string()),
        price: Set(1_000_000),
        agent_code: Set(agent_code.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert property")
}

pub async fn insert_brokerage(
    db: &DatabaseConnection,
    code: &str,
    client_name: &str,
    agent_code: Option<&str>,
) -> brokerage::Model {
    brokerage::ActiveModel {
        brokerage_code: Set(code.to_string()),
        property_code: Set(None),
        client_name: Set(client_name.to_string()),
        amount: Set(50_000),
        status: Set("open".to_string()),
        agent_code: Set(agent_code.map(str::to_string)),
        created_at: Set(Utc::now().timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert brokerage")
}

pub async fn insert_deal(
    db: &DatabaseConnection,
    stage: &str,
    agent_code: Option<&str>,
) -> deal::Model {
    deal::ActiveModel {
        brokerage_code: Set(None),
        property_code: Set(None),
        amount: Set(75_000),
        stage: Set(stage.to_string()),
        agent_code: Set(agent_code.map(str::to_string)),
        created_at: Set(Utc::now().timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert deal")
}

pub async fn insert_notification(
    db: &DatabaseConnection,
    title: &str,
    agent_code: Option<&str>,
    created_at: i64,
) -> notification::Model {
    notification::ActiveModel {
        title: Set(title.to_string()),
        message: Set(format!("{} details", title)),
        agent_code: Set(agent_code.map(str::to_string)),
        created_by: Set(None),
        is_read: Set(false),
        created_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert notification")
}
