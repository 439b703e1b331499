// Bootstrap commands: permission vocabulary sync and the first Super Admin

use crate::app_data::AppData;
use crate::errors::InternalError;
use crate::stores::{CreatedUser, NewUser, SyncReport};
use crate::types::internal::{RequestContext, RoleName};

/// Insert any missing permission tags and hierarchy roles
pub async fn sync_permissions(app_data: &AppData) -> Result<SyncReport, InternalError> {
    let report = app_data.rbac_store.sync_vocabulary(&app_data.db).await?;
    println!(
        "✓ Permission vocabulary synced ({} permissions, {} roles created)",
        report.permissions_created, report.roles_created
    );
    Ok(report)
}

/// Create a Super Admin account
///
/// The vocabulary is synced first so the role exists on a fresh database.
pub async fn create_super_admin(
    app_data: &AppData,
    name: String,
    email: String,
    password: String,
    phone: Option<String>,
) -> Result<CreatedUser, InternalError> {
    let ctx = RequestContext::for_cli("create-user");
    app_data.rbac_store.sync_vocabulary(&app_data.db).await?;

    let label = RoleName::SuperAdmin.label();
    let role = app_data
        .rbac_store
        .find_role_by_name(&app_data.db, label)
        .await?
        .ok_or_else(|| InternalError::not_found("role", label))?;

    let created = app_data
        .credential_store
        .create_user(
            &app_data.db,
            NewUser {
                name,
                email,
                password,
                phone,
                role_id: role.id,
                manager_code: None,
                admin_code: None,
                commission_bps: None,
            },
        )
        .await?;

    tracing::info!(
        "Super Admin {} created from CLI (request {})",
        created.user.code,
        ctx.request_id
    );
    println!("\n✓ Super Admin account created");
    println!("  Email: {}", created.user.email);
    println!("  Code:  {}", created.user.code);

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::ConflictError;
    use crate::services::CodeGenerator;
    use crate::test::utils::{TEST_PASSWORD, setup_test_db};

    async fn test_app_data() -> AppData {
        let db = setup_test_db().await;
        AppData::build(
            db,
            "test-secret-key-minimum-32-characters-long".to_string(),
            "test-pepper".to_string(),
            60,
            CodeGenerator::random(),
        )
    }

    #[tokio::test]
    async fn test_create_super_admin_on_fresh_database() {
        let app_data = test_app_data().await;

        let created = create_super_admin(
            &app_data,
            "Root".to_string(),
            "root@example.com".to_string(),
            TEST_PASSWORD.to_string(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(created.role.name, "Super Admin");
        assert!(created.user.code.starts_with("SAD-"));
    }

    #[tokio::test]
    async fn test_create_super_admin_twice_is_conflict() {
        let app_data = test_app_data().await;
        let create = || {
            create_super_admin(
                &app_data,
                "Root".to_string(),
                "root@example.com".to_string(),
                TEST_PASSWORD.to_string(),
                None,
            )
        };

        create().await.unwrap();
        let result = create().await;

        assert!(matches!(
            result,
            Err(InternalError::Conflict(ConflictError::DuplicateEmail(_)))
        ));
    }

    #[tokio::test]
    async fn test_sync_permissions_is_idempotent() {
        let app_data = test_app_data().await;

        let first = sync_permissions(&app_data).await.unwrap();
        let second = sync_permissions(&app_data).await.unwrap();

        assert_eq!(first.roles_created, 4);
        assert_eq!(second, SyncReport::default());
    }
}
