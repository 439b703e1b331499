// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::Utc;
use poem::Endpoint;
use poem::test::{TestClient, TestResponse};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use serde_json::{Value, json};

use brokerage_backend::AppData;
use brokerage_backend::api;
use brokerage_backend::services::CodeGenerator;
use brokerage_backend::stores::{CreatedUser, NewUser};
use brokerage_backend::types::db::{brokerage, property};
use brokerage_backend::types::internal::RoleName;
use migration::{Migrator, MigratorTrait};

pub const TEST_JWT_SECRET: &str = "integration-test-jwt-secret-with-32-chars";
pub const TEST_PEPPER: &str = "integration-test-pepper";
pub const TEST_PASSWORD: &str = "password123";

/// Creates an in-memory database with migrations applied and the vocabulary synced
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    brokerage_backend::stores::RbacStore::new()
        .sync_vocabulary(&db)
        .await
        .expect("Failed to sync vocabulary");

    db
}

pub async fn setup_app_data() -> Arc<AppData> {
    let db = setup_test_db().await;
    Arc::new(AppData::build(
        db,
        TEST_JWT_SECRET.to_string(),
        TEST_PEPPER.to_string(),
        60,
        CodeGenerator::random(),
    ))
}

pub fn test_client(app_data: Arc<AppData>) -> TestClient<impl Endpoint> {
    TestClient::new(api::routes(app_data, "http://localhost:3000/api"))
}

/// Create a user holding one of the hierarchy roles
pub async fn seed_user(
    app_data: &AppData,
    email: &str,
    role: RoleName,
    manager_code: Option<&str>,
    admin_code: Option<&str>,
) -> CreatedUser {
    let role = app_data
        .rbac_store
        .find_role_by_name(&app_data.db, role.label())
        .await
        .expect("Failed to look up role")
        .expect("Role should exist after sync");

    seed_user_with_role(app_data, email, role.id, manager_code, admin_code).await
}

pub async fn seed_user_with_role(
    app_data: &AppData,
    email: &str,
    role_id: i32,
    manager_code: Option<&str>,
    admin_code: Option<&str>,
) -> CreatedUser {
    app_data
        .credential_store
        .create_user(
            &app_data.db,
            NewUser {
                name: email.split('@').next().unwrap_or("user").to_string(),
                email: email.to_string(),
                password: TEST_PASSWORD.to_string(),
                phone: None,
                role_id,
                manager_code: manager_code.map(str::to_string),
                admin_code: admin_code.map(str::to_string),
                commission_bps: None,
            },
        )
        .await
        .expect("Failed to seed user")
}

/// Log in through the API and return the bearer token
pub async fn login<E: Endpoint>(client: &TestClient<E>, email: &str) -> String {
    let resp = client
        .post("/api/auth/login")
        .body_json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await;
    resp.assert_status_is_ok();

    let body = body_json(resp).await;
    body["access_token"]
        .as_str()
        .expect("access_token should be a string")
        .to_string()
}

pub async fn body_json(resp: TestResponse) -> Value {
    resp.0
        .into_body()
        .into_json::<Value>()
        .await
        .expect("Response body should be JSON")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
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
        price: Set(2_500_000),
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
        amount: Set(120_000),
        status: Set("open".to_string()),
        agent_code: Set(agent_code.map(str::to_string)),
        created_at: Set(Utc::now().timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert brokerage")
}

/// Helper to manage environment variables in tests
///
/// Cleans up specified environment variables on creation and drop,
/// ensuring test isolation when dealing with global environment state.
pub struct EnvGuard {
    vars: Vec<String>,
}

impl EnvGuard {
    pub fn new(vars: Vec<&str>) -> Self {
        for var in &vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
        Self {
            vars: vars.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for var in &self.vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }
}

/// Global mutex for tests that modify environment variables
pub static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());
