use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};

use crate::errors::InternalError;
use crate::errors::internal::{AuthenticationError, ConflictError, ValidationError};
use crate::services::code_generator::retry_on_code_collision;
use crate::services::{CodeGenerator, PasswordHasher};
use crate::stores::RbacStore;
use crate::types::db::{agent, manager, role, user, user_role};
use crate::types::internal::{CodePrefix, HierarchyCode, RoleName};

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Input for `CredentialStore::create_user`
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub role_id: i32,
    pub manager_code: Option<String>,
    pub admin_code: Option<String>,
    pub commission_bps: Option<i32>,
}

/// A freshly created user and the role it was given
#[derive(Debug, Clone)]
pub struct CreatedUser {
    pub user: user::Model,
    pub role: role::Model,
}

/// Hierarchy links validated for a new agent or manager
#[derive(Debug, Default)]
struct HierarchyLinks {
    manager_code: Option<String>,
    admin_code: Option<String>,
}

/// CredentialStore manages users, their password hashes and business codes
pub struct CredentialStore {
    hasher: Arc<PasswordHasher>,
    codes: CodeGenerator,
}

impl CredentialStore {
    /// Create a new CredentialStore
    ///
    /// # Arguments
    /// * `hasher` - Peppered Argon2 hasher
    /// * `codes` - Generator for user codes
    pub fn new(hasher: Arc<PasswordHasher>, codes: CodeGenerator) -> Self {
        Self { hasher, codes }
    }

    pub async fn find_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: i32,
    ) -> Result<Option<user::Model>, InternalError> {
        user::Entity::find_by_id(user_id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user", e))
    }

    /// Verify an email/password pair
    ///
    /// # Returns
    /// * `Ok(user)` - Credentials match
    /// * `Err(AuthenticationError::InvalidCredentials)` - Unknown email or wrong password
    pub async fn verify_credentials(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
        password: &str,
    ) -> Result<user::Model, InternalError> {
        let user = user::Entity::find()
            .filter(user::Column::Email.eq(email.trim()))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("verify_credentials", e))?
            .ok_or(AuthenticationError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(AuthenticationError::InvalidCredentials.into());
        }

        Ok(user)
    }

    /// Create a user with its role assignment, sub-record and generated code
    ///
    /// The user row, the role assignment and the agent or manager record are
    /// written in one transaction. A code lost to a concurrent insert rolls the
    /// whole attempt back and retries with a fresh code.
    ///
    /// # Returns
    /// * `Ok(CreatedUser)` - User and assigned role
    /// * `Err(InternalError::Validation)` - Bad input, unknown role or dangling hierarchy code
    /// * `Err(ConflictError::DuplicateEmail)` - Email already registered
    pub async fn create_user(
        &self,
        db: &DatabaseConnection,
        input: NewUser,
    ) -> Result<CreatedUser, InternalError> {
        Self::validate_new_user(&input)?;

        let role = role::Entity::find_by_id(input.role_id)
            .one(db)
            .await
            .map_err(|e| InternalError::database("create_user_find_role", e))?
            .ok_or_else(|| InternalError::validation("role_id", "unknown role"))?;

        let role_name = RoleName::parse(&role.name);
        let prefix = role_name
            .map(|r| r.code_prefix())
            .unwrap_or(CodePrefix::User);

        // Hash once; retries only resample the code
        let password_hash = self.hasher.hash(&input.password)?;

        let (fields, assigned, hash) = (&input, &role, password_hash.as_str());
        let created = retry_on_code_collision(prefix, move || {
            self.try_create_user(db, fields, assigned, role_name, prefix, hash)
        })
        .await?;

        tracing::info!(
            "Created user {} ({}) with role {}",
            created.user.id,
            created.user.code,
            role.name
        );
        Ok(created)
    }

    fn validate_new_user(input: &NewUser) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        if input.name.trim().is_empty() {
            errors.push("name", "must not be empty");
        }
        let email = input.email.trim();
        if email.is_empty() || !email.contains('@') {
            errors.push("email", "must be a valid email address");
        }
        if input.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LENGTH),
            );
        }
        if input.commission_bps.is_some_and(|bps| !(0..=10_000).contains(&bps)) {
            errors.push("commission_bps", "must be between 0 and 10000");
        }
        errors.into_result()
    }

    async fn try_create_user(
        &self,
        db: &DatabaseConnection,
        input: &NewUser,
        role: &role::Model,
        role_name: Option<RoleName>,
        prefix: CodePrefix,
        password_hash: &str,
    ) -> Result<CreatedUser, InternalError> {
        let email = input.email.trim().to_string();
        let txn = db.begin().await.map_err(InternalError::transaction_begin)?;

        let email_taken = user::Entity::find()
            .filter(user::Column::Email.eq(&email))
            .one(&txn)
            .await
            .map_err(|e| InternalError::database("create_user_check_email", e))?
            .is_some();
        if email_taken {
            return Err(ConflictError::DuplicateEmail(email).into());
        }

        let links = match role_name {
            Some(RoleName::Agent) => Self::agent_links(&txn, input).await?,
            Some(RoleName::Manager) => HierarchyLinks {
                manager_code: None,
                admin_code: Self::validated_admin_code(&txn, input.admin_code.as_deref()).await?,
            },
            _ => HierarchyLinks::default(),
        };

        let code = self.codes.generate(&txn, prefix).await?;
        let now = Utc::now().timestamp();

        let user = user::ActiveModel {
            name: Set(input.name.trim().to_string()),
            email: Set(email),
            password_hash: Set(password_hash.to_string()),
            code: Set(code.clone()),
            phone: Set(input.phone.clone()),
            avatar: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| InternalError::database("create_user_insert", e))?;

        RbacStore::replace_user_roles(&txn, user.id, &[role.id]).await?;

        match role_name {
            Some(RoleName::Agent) => {
                agent::Entity::insert(agent::ActiveModel {
                    user_id: Set(user.id),
                    agent_code: Set(code.clone()),
                    manager_code: Set(links.manager_code),
                    admin_code: Set(links.admin_code),
                    commission_bps: Set(input.commission_bps.unwrap_or(0)),
                    overdraft: Set(0),
                    balance: Set(0),
                    created_at: Set(now),
                })
                .exec_without_returning(&txn)
                .await
                .map_err(|e| InternalError::database("create_user_insert_agent", e))?;
            }
            Some(RoleName::Manager) => {
                manager::Entity::insert(manager::ActiveModel {
                    user_id: Set(user.id),
                    manager_code: Set(code.clone()),
                    admin_code: Set(links.admin_code),
                    created_at: Set(now),
                })
                .exec_without_returning(&txn)
                .await
                .map_err(|e| InternalError::database("create_user_insert_manager", e))?;
            }
            _ => {}
        }

        txn.commit().await.map_err(InternalError::transaction_commit)?;

        Ok(CreatedUser {
            user,
            role: role.clone(),
        })
    }

    /// Validate an agent's manager and admin codes
    ///
    /// An agent named under a manager inherits the manager's admin when no
    /// admin code is given.
    async fn agent_links(
        conn: &impl ConnectionTrait,
        input: &NewUser,
    ) -> Result<HierarchyLinks, InternalError> {
        let manager_code = input.manager_code.as_deref().and_then(HierarchyCode::parse);

        let manager = match &manager_code {
            Some(code) => Some(
                manager::Entity::find()
                    .filter(manager::Column::ManagerCode.eq(code.as_str()))
                    .one(conn)
                    .await
                    .map_err(|e| InternalError::database("create_user_find_manager", e))?
                    .ok_or_else(|| InternalError::validation("manager_code", "unknown manager"))?,
            ),
            None => None,
        };

        let admin_code = match Self::validated_admin_code(conn, input.admin_code.as_deref()).await? {
            Some(code) => Some(code),
            None => manager.as_ref().and_then(|m| m.admin_code.clone()),
        };

        Ok(HierarchyLinks {
            manager_code: manager.map(|m| m.manager_code),
            admin_code,
        })
    }

    /// A non-blank admin code must belong to a user holding the Admin role
    async fn validated_admin_code(
        conn: &impl ConnectionTrait,
        admin_code: Option<&str>,
    ) -> Result<Option<String>, InternalError> {
        let Some(code) = admin_code.and_then(HierarchyCode::parse) else {
            return Ok(None);
        };

        let admin = user::Entity::find()
            .filter(user::Column::Code.eq(code.as_str()))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("create_user_find_admin", e))?
            .ok_or_else(|| InternalError::validation("admin_code", "unknown admin"))?;

        let is_admin = RbacStore::new()
            .resolve_roles(conn, admin.id)
            .await
            .first()
            .and_then(|r| RoleName::parse(&r.name))
            == Some(RoleName::Admin);
        if !is_admin {
            return Err(InternalError::validation("admin_code", "code does not belong to an admin"));
        }

        Ok(Some(code.into()))
    }

    /// Delete a user with its role rows and sub-record
    ///
    /// Deleting a manager also deletes every agent reporting to it, including
    /// those agents' users.
    ///
    /// # Returns
    /// * `Ok(ids)` - Ids of every deleted user, the target first
    /// * `Err(InternalError::NotFound)` - No such user
    pub async fn delete_user(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<i32>, InternalError> {
        let txn = db.begin().await.map_err(InternalError::transaction_begin)?;

        if self.find_user(&txn, user_id).await?.is_none() {
            return Err(InternalError::not_found("user", user_id));
        }

        let mut deleted = vec![user_id];

        let managed = manager::Entity::find_by_id(user_id)
            .one(&txn)
            .await
            .map_err(|e| InternalError::database("delete_user_find_manager", e))?;
        if let Some(manager) = managed {
            let agent_ids: Vec<i32> = agent::Entity::find()
                .filter(agent::Column::ManagerCode.eq(manager.manager_code.as_str()))
                .all(&txn)
                .await
                .map_err(|e| InternalError::database("delete_user_find_agents", e))?
                .into_iter()
                .map(|a| a.user_id)
                .collect();
            deleted.extend(agent_ids);
        }

        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.is_in(deleted.clone()))
            .exec(&txn)
            .await
            .map_err(|e| InternalError::database("delete_user_roles", e))?;
        agent::Entity::delete_many()
            .filter(agent::Column::UserId.is_in(deleted.clone()))
            .exec(&txn)
            .await
            .map_err(|e| InternalError::database("delete_user_agents", e))?;
        manager::Entity::delete_many()
            .filter(manager::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| InternalError::database("delete_user_manager", e))?;
        user::Entity::delete_many()
            .filter(user::Column::Id.is_in(deleted.clone()))
            .exec(&txn)
            .await
            .map_err(|e| InternalError::database("delete_user_users", e))?;

        txn.commit().await.map_err(InternalError::transaction_commit)?;

        tracing::info!("Deleted users {:?}", deleted);
        Ok(deleted)
    }

    pub async fn find_manager_by_code(
        &self,
        conn: &impl ConnectionTrait,
        manager_code: &str,
    ) -> Result<Option<manager::Model>, InternalError> {
        manager::Entity::find()
            .filter(manager::Column::ManagerCode.eq(manager_code))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_manager_by_code", e))
    }

    /// Sub-records carrying a user's position in the hierarchy
    pub async fn hierarchy_of(
        &self,
        conn: &impl ConnectionTrait,
        user_id: i32,
    ) -> Result<(Option<agent::Model>, Option<manager::Model>), InternalError> {
        let agent = agent::Entity::find_by_id(user_id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("hierarchy_of_agent", e))?;
        let manager = manager::Entity::find_by_id(user_id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("hierarchy_of_manager", e))?;
        Ok((agent, manager))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::code_generator::is_code_collision;
    use crate::test::utils::{new_user, setup_synced_db, test_credential_store};

    #[tokio::test]
    async fn test_create_agent_generates_prefixed_code_and_sub_record() {
        let db = setup_synced_db().await;
        let store = test_credential_store();

        let created = store.create_user(&db, new_user("agent@example.com", 4)).await.unwrap();

        assert!(created.user.code.starts_with("AGT-"));
        assert_eq!(created.role.name, "Agent");
        let (agent, manager) = store.hierarchy_of(&db, created.user.id).await.unwrap();
        assert_eq!(agent.unwrap().agent_code, created.user.code);
        assert!(manager.is_none());
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed_and_verifies() {
        let db = setup_synced_db().await;
        let store = test_credential_store();
        store.create_user(&db, new_user("login@example.com", 2)).await.unwrap();

        let user = store
            .verify_credentials(&db, "login@example.com", "password123")
            .await
            .unwrap();

        assert!(user.password_hash.starts_with("$argon2"));
        let wrong = store.verify_credentials(&db, "login@example.com", "nope-nope").await;
        assert!(matches!(
            wrong,
            Err(InternalError::Authentication(AuthenticationError::InvalidCredentials))
        ));
        let unknown = store.verify_credentials(&db, "ghost@example.com", "password123").await;
        assert!(matches!(
            unknown,
            Err(InternalError::Authentication(AuthenticationError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() {
        let db = setup_synced_db().await;
        let store = test_credential_store();
        store.create_user(&db, new_user("dup@example.com", 2)).await.unwrap();

        let result = store.create_user(&db, new_user("dup@example.com", 3)).await;

        assert!(matches!(
            result,
            Err(InternalError::Conflict(ConflictError::DuplicateEmail(_)))
        ));
    }

    #[tokio::test]
    async fn test_email_race_is_retried_into_duplicate_email() {
        let db = setup_synced_db().await;
        let store = test_credential_store();
        let first = store.create_user(&db, new_user("race@example.com", 4)).await.unwrap();

        let racing = user::ActiveModel {
            name: Set("Racer".to_string()),
            email: Set(first.user.email.clone()),
            password_hash: Set("hash".to_string()),
            code: Set("AGT-000001".to_string()),
            created_at: Set(0),
            updated_at: Set(0),
            ..Default::default()
        }
        .insert(&db)
        .await
        .map_err(|e| InternalError::database("create_user_insert", e))
        .unwrap_err();
        assert!(is_code_collision(&racing));

        let retried = store.create_user(&db, new_user("race@example.com", 4)).await;

        assert!(matches!(
            retried,
            Err(InternalError::Conflict(ConflictError::DuplicateEmail(_)))
        ));
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_with_every_field() {
        let db = setup_synced_db().await;
        let store = test_credential_store();
        let mut input = new_user("not-an-email", 4);
        input.name = " ".to_string();
        input.password = "short".to_string();

        let result = store.create_user(&db, input).await;

        match result {
            Err(InternalError::Validation(err)) => {
                let fields: Vec<_> = err.fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email", "password"]);
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_agent_with_unknown_manager_is_rejected_without_writes() {
        let db = setup_synced_db().await;
        let store = test_credential_store();
        let mut input = new_user("orphan@example.com", 4);
        input.manager_code = Some("MNG-999999".to_string());

        let result = store.create_user(&db, input).await;

        assert!(matches!(result, Err(InternalError::Validation(_))));
        let left = user::Entity::find().all(&db).await.unwrap();
        assert!(left.is_empty());
    }

    #[tokio::test]
    async fn test_agent_inherits_admin_code_from_manager() {
        let db = setup_synced_db().await;
        let store = test_credential_store();
        let admin = store.create_user(&db, new_user("admin@example.com", 2)).await.unwrap();
        let mut manager_input = new_user("manager@example.com", 3);
        manager_input.admin_code = Some(admin.user.code.clone());
        let manager = store.create_user(&db, manager_input).await.unwrap();

        let mut agent_input = new_user("agent@example.com", 4);
        agent_input.manager_code = Some(manager.user.code.clone());
        let agent = store.create_user(&db, agent_input).await.unwrap();

        let (record, _) = store.hierarchy_of(&db, agent.user.id).await.unwrap();
        let record = record.unwrap();
        assert_eq!(record.manager_code.as_deref(), Some(manager.user.code.as_str()));
        assert_eq!(record.admin_code.as_deref(), Some(admin.user.code.as_str()));
    }

    #[tokio::test]
    async fn test_admin_code_must_belong_to_an_admin() {
        let db = setup_synced_db().await;
        let store = test_credential_store();
        let agent = store.create_user(&db, new_user("agent@example.com", 4)).await.unwrap();
        let mut manager_input = new_user("manager@example.com", 3);
        manager_input.admin_code = Some(agent.user.code);

        let result = store.create_user(&db, manager_input).await;

        assert!(matches!(result, Err(InternalError::Validation(_))));
    }

    #[tokio::test]
    async fn test_deleting_manager_cascades_to_its_agents() {
        let db = setup_synced_db().await;
        let store = test_credential_store();
        let manager = store.create_user(&db, new_user("manager@example.com", 3)).await.unwrap();
        let mut agent_input = new_user("agent@example.com", 4);
        agent_input.manager_code = Some(manager.user.code.clone());
        let agent = store.create_user(&db, agent_input).await.unwrap();
        let bystander = store.create_user(&db, new_user("other@example.com", 4)).await.unwrap();

        let deleted = store.delete_user(&db, manager.user.id).await.unwrap();

        assert_eq!(deleted, vec![manager.user.id, agent.user.id]);
        assert!(store.find_user(&db, agent.user.id).await.unwrap().is_none());
        assert!(store.find_user(&db, bystander.user.id).await.unwrap().is_some());
        let roles = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(agent.user.id))
            .all(&db)
            .await
            .unwrap();
        assert!(roles.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let db = setup_synced_db().await;
        let store = test_credential_store();

        let result = store.delete_user(&db, 404).await;

        assert!(matches!(result, Err(InternalError::NotFound { .. })));
    }
}
