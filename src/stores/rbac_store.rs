use std::collections::{BTreeSet, HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::errors::InternalError;
use crate::errors::internal::ValidationError;
use crate::types::db::{permission, role, role_permission, user, user_role};
use crate::types::internal::{Action, PermissionTag, Resource, RoleName};

/// Counts of rows inserted by `sync_vocabulary`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub permissions_created: usize,
    pub roles_created: usize,
}

/// Role and permission graph
///
/// Reads used by authentication and gating fail closed: a database error is
/// logged and reported as "no roles" / "no permissions", which downstream
/// checks turn into a denial. Every write replaces a complete set inside one
/// transaction.
#[derive(Debug, Default, Clone)]
pub struct RbacStore;

impl RbacStore {
    pub fn new() -> Self {
        Self
    }

    /// Roles assigned to a user, lowest id first
    ///
    /// The first entry is the user's canonical role. Returns an empty list when
    /// the user has no roles or the lookup fails.
    pub async fn resolve_roles(&self, conn: &impl ConnectionTrait, user_id: i32) -> Vec<role::Model> {
        let roles = role::Entity::find()
            .inner_join(user_role::Entity)
            .filter(user_role::Column::UserId.eq(user_id))
            .order_by_asc(role::Column::Id)
            .all(conn)
            .await;

        match roles {
            Ok(roles) => roles,
            Err(e) => {
                tracing::error!("Failed to resolve roles for user {}: {}", user_id, e);
                Vec::new()
            }
        }
    }

    /// Distinct union of the permissions of every role assigned to a user
    ///
    /// Short-circuits without a permission query when the user has no roles.
    pub async fn resolve_permissions(
        &self,
        conn: &impl ConnectionTrait,
        user_id: i32,
    ) -> Vec<permission::Model> {
        let role_ids: Vec<i32> = self
            .resolve_roles(conn, user_id)
            .await
            .into_iter()
            .map(|r| r.id)
            .collect();

        if role_ids.is_empty() {
            return Vec::new();
        }

        let permissions = permission::Entity::find()
            .inner_join(role_permission::Entity)
            .filter(role_permission::Column::RoleId.is_in(role_ids))
            .distinct()
            .order_by_asc(permission::Column::Id)
            .all(conn)
            .await;

        match permissions {
            Ok(permissions) => permissions,
            Err(e) => {
                tracing::error!("Failed to resolve permissions for user {}: {}", user_id, e);
                Vec::new()
            }
        }
    }

    /// Permissions granted to one role
    pub async fn role_permissions(
        &self,
        conn: &impl ConnectionTrait,
        role_id: i32,
    ) -> Result<Vec<permission::Model>, InternalError> {
        permission::Entity::find()
            .inner_join(role_permission::Entity)
            .filter(role_permission::Column::RoleId.eq(role_id))
            .order_by_asc(permission::Column::Id)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("role_permissions", e))
    }

    pub async fn list_roles(&self, conn: &impl ConnectionTrait) -> Result<Vec<role::Model>, InternalError> {
        role::Entity::find()
            .order_by_asc(role::Column::Id)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_roles", e))
    }

    pub async fn list_permissions(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<Vec<permission::Model>, InternalError> {
        permission::Entity::find()
            .order_by_asc(permission::Column::Id)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_permissions", e))
    }

    pub async fn find_role(
        &self,
        conn: &impl ConnectionTrait,
        role_id: i32,
    ) -> Result<Option<role::Model>, InternalError> {
        role::Entity::find_by_id(role_id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_role", e))
    }

    pub async fn find_role_by_name(
        &self,
        conn: &impl ConnectionTrait,
        name: &str,
    ) -> Result<Option<role::Model>, InternalError> {
        role::Entity::find()
            .filter(role::Column::Name.eq(name))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_role_by_name", e))
    }

    /// Replace a user's complete role set
    ///
    /// Duplicate ids are collapsed and unknown ids are rejected before any
    /// write. The delete and the inserts commit together, so a failure leaves
    /// the previous assignment in place.
    ///
    /// # Returns
    /// * `Ok(roles)` - The roles now assigned, lowest id first
    /// * `Err(InternalError::NotFound)` - User does not exist
    /// * `Err(InternalError::Validation)` - One or more role ids do not exist
    pub async fn assign_roles(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
        role_ids: &[i32],
    ) -> Result<Vec<role::Model>, InternalError> {
        let role_ids: Vec<i32> = role_ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

        let txn = db.begin().await.map_err(InternalError::transaction_begin)?;

        let user_exists = user::Entity::find_by_id(user_id)
            .one(&txn)
            .await
            .map_err(|e| InternalError::database("assign_roles_find_user", e))?
            .is_some();
        if !user_exists {
            return Err(InternalError::not_found("user", user_id));
        }

        Self::validate_role_ids(&txn, &role_ids).await?;
        Self::replace_user_roles(&txn, user_id, &role_ids).await?;

        txn.commit().await.map_err(InternalError::transaction_commit)?;

        tracing::info!("Assigned roles {:?} to user {}", role_ids, user_id);
        Ok(self.resolve_roles(db, user_id).await)
    }

    /// Fail with a validation error naming every unknown role id
    pub(crate) async fn validate_role_ids(
        conn: &impl ConnectionTrait,
        role_ids: &[i32],
    ) -> Result<(), InternalError> {
        if role_ids.is_empty() {
            return Ok(());
        }

        let known: HashSet<i32> = role::Entity::find()
            .filter(role::Column::Id.is_in(role_ids.to_vec()))
            .all(conn)
            .await
            .map_err(|e| InternalError::database("validate_role_ids", e))?
            .into_iter()
            .map(|r| r.id)
            .collect();

        let mut errors = ValidationError::default();
        for id in role_ids.iter().filter(|id| !known.contains(*id)) {
            errors.push("role_ids", format!("unknown role id {}", id));
        }
        errors.into_result()?;
        Ok(())
    }

    /// Delete-then-insert of a user's role rows on an existing connection
    ///
    /// Callers own the transaction; this never commits.
    pub(crate) async fn replace_user_roles(
        conn: &impl ConnectionTrait,
        user_id: i32,
        role_ids: &[i32],
    ) -> Result<(), InternalError> {
        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("replace_user_roles_delete", e))?;

        if role_ids.is_empty() {
            return Ok(());
        }

        let rows = role_ids.iter().map(|role_id| user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(*role_id),
        });
        user_role::Entity::insert_many(rows)
            .exec_without_returning(conn)
            .await
            .map_err(|e| InternalError::database("replace_user_roles_insert", e))?;

        Ok(())
    }

    /// Replace a role's complete permission set
    ///
    /// # Returns
    /// * `Ok(permissions)` - The permissions now granted, by id
    /// * `Err(InternalError::NotFound)` - Role does not exist
    /// * `Err(InternalError::Validation)` - One or more permission ids do not exist
    pub async fn replace_role_permissions(
        &self,
        db: &DatabaseConnection,
        role_id: i32,
        permission_ids: &[i32],
    ) -> Result<Vec<permission::Model>, InternalError> {
        let permission_ids: Vec<i32> = permission_ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let txn = db.begin().await.map_err(InternalError::transaction_begin)?;

        if self.find_role(&txn, role_id).await?.is_none() {
            return Err(InternalError::not_found("role", role_id));
        }

        if !permission_ids.is_empty() {
            let known: HashSet<i32> = permission::Entity::find()
                .filter(permission::Column::Id.is_in(permission_ids.clone()))
                .all(&txn)
                .await
                .map_err(|e| InternalError::database("replace_role_permissions_validate", e))?
                .into_iter()
                .map(|p| p.id)
                .collect();

            let mut errors = ValidationError::default();
            for id in permission_ids.iter().filter(|id| !known.contains(*id)) {
                errors.push("permission_ids", format!("unknown permission id {}", id));
            }
            errors.into_result()?;
        }

        role_permission::Entity::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .exec(&txn)
            .await
            .map_err(|e| InternalError::database("replace_role_permissions_delete", e))?;

        if !permission_ids.is_empty() {
            let rows = permission_ids.iter().map(|permission_id| role_permission::ActiveModel {
                role_id: Set(role_id),
                permission_id: Set(*permission_id),
            });
            role_permission::Entity::insert_many(rows)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| InternalError::database("replace_role_permissions_insert", e))?;
        }

        let granted = self.role_permissions(&txn, role_id).await?;
        txn.commit().await.map_err(InternalError::transaction_commit)?;

        tracing::info!("Replaced permissions of role {} with {:?}", role_id, permission_ids);
        Ok(granted)
    }

    /// Insert missing permission tags and canonical roles
    ///
    /// Roles created here receive their default grants. Roles that already
    /// exist keep whatever an administrator configured.
    pub async fn sync_vocabulary(&self, db: &DatabaseConnection) -> Result<SyncReport, InternalError> {
        let txn = db.begin().await.map_err(InternalError::transaction_begin)?;
        let mut report = SyncReport::default();

        let mut permission_ids: HashMap<String, i32> = self
            .list_permissions(&txn)
            .await?
            .into_iter()
            .map(|p| (p.name, p.id))
            .collect();

        for tag in PermissionTag::all() {
            let name = tag.to_string();
            if permission_ids.contains_key(&name) {
                continue;
            }
            let inserted = permission::ActiveModel {
                name: Set(name.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| InternalError::database("sync_vocabulary_permission", e))?;
            permission_ids.insert(name, inserted.id);
            report.permissions_created += 1;
        }

        for role_name in RoleName::ALL {
            if self.find_role_by_name(&txn, role_name.label()).await?.is_some() {
                continue;
            }

            let created = role::ActiveModel {
                name: Set(role_name.label().to_string()),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| InternalError::database("sync_vocabulary_role", e))?;

            let grants: Vec<role_permission::ActiveModel> = default_grants(role_name)
                .into_iter()
                .filter_map(|tag| permission_ids.get(&tag.to_string()).copied())
                .map(|permission_id| role_permission::ActiveModel {
                    role_id: Set(created.id),
                    permission_id: Set(permission_id),
                })
                .collect();

            if !grants.is_empty() {
                role_permission::Entity::insert_many(grants)
                    .exec_without_returning(&txn)
                    .await
                    .map_err(|e| InternalError::database("sync_vocabulary_grants", e))?;
            }

            tracing::info!("Created role {} with id {}", role_name, created.id);
            report.roles_created += 1;
        }

        txn.commit().await.map_err(InternalError::transaction_commit)?;

        if report.permissions_created > 0 || report.roles_created > 0 {
            tracing::info!(
                "Permission vocabulary synced: {} permissions, {} roles created",
                report.permissions_created,
                report.roles_created
            );
        }
        Ok(report)
    }
}

/// Grants given to a canonical role when the sync first creates it
pub fn default_grants(role: RoleName) -> Vec<PermissionTag> {
    const BUSINESS: [Resource; 6] = [
        Resource::Property,
        Resource::Brokerage,
        Resource::Estimate,
        Resource::Visit,
        Resource::Deal,
        Resource::Notification,
    ];

    match role {
        RoleName::SuperAdmin => PermissionTag::all().collect(),
        RoleName::Admin => PermissionTag::all()
            .filter(|tag| match tag.resource {
                Resource::Role | Resource::Permission => tag.action == Action::List,
                _ => true,
            })
            .collect(),
        RoleName::Manager => {
            let mut tags: Vec<PermissionTag> = BUSINESS
                .into_iter()
                .flat_map(|r| {
                    [Action::List, Action::View, Action::Create, Action::Edit, Action::Export]
                        .into_iter()
                        .map(move |a| PermissionTag::new(r, a))
                })
                .collect();
            tags.extend([
                PermissionTag::USER_LIST,
                PermissionTag::USER_CREATE,
                PermissionTag::REPORT_VIEW,
                PermissionTag::new(Resource::Report, Action::Export),
            ]);
            tags
        }
        RoleName::Agent => {
            let mut tags: Vec<PermissionTag> = BUSINESS
                .into_iter()
                .flat_map(|r| {
                    [Action::List, Action::View]
                        .into_iter()
                        .map(move |a| PermissionTag::new(r, a))
                })
                .collect();
            tags.extend([
                PermissionTag::PROPERTY_CREATE,
                PermissionTag::BROKERAGE_CREATE,
                PermissionTag::new(Resource::Estimate, Action::Create),
                PermissionTag::new(Resource::Visit, Action::Create),
                PermissionTag::REPORT_VIEW,
            ]);
            tags
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_db;

    #[test]
    fn test_default_grants_narrow_down_the_hierarchy() {
        let super_admin = default_grants(RoleName::SuperAdmin).len();
        let admin = default_grants(RoleName::Admin).len();
        let manager = default_grants(RoleName::Manager).len();
        let agent = default_grants(RoleName::Agent).len();

        assert_eq!(super_admin, PermissionTag::all().count());
        assert!(super_admin > admin && admin > manager && manager > agent);
        assert!(!default_grants(RoleName::Admin).contains(&PermissionTag::PERMISSION_EDIT));
        assert!(!default_grants(RoleName::Agent).contains(&PermissionTag::USER_LIST));
    }

    #[tokio::test]
    async fn test_sync_creates_roles_in_hierarchy_order() {
        let db = setup_test_db().await;
        let store = RbacStore::new();

        let report = store.sync_vocabulary(&db).await.unwrap();
        let roles = store.list_roles(&db).await.unwrap();

        assert_eq!(report.permissions_created, PermissionTag::all().count());
        assert_eq!(report.roles_created, 4);
        let names: Vec<_> = roles.iter().map(|r| (r.id, r.name.as_str())).collect();
        assert_eq!(names, vec![(1, "Super Admin"), (2, "Admin"), (3, "Manager"), (4, "Agent")]);
    }

    #[tokio::test]
    async fn test_sync_is_idempotent_and_keeps_edited_grants() {
        let db = setup_test_db().await;
        let store = RbacStore::new();
        store.sync_vocabulary(&db).await.unwrap();

        let agent = store.find_role_by_name(&db, "Agent").await.unwrap().unwrap();
        store.replace_role_permissions(&db, agent.id, &[1]).await.unwrap();

        let report = store.sync_vocabulary(&db).await.unwrap();

        assert_eq!(report, SyncReport::default());
        let granted = store.role_permissions(&db, agent.id).await.unwrap();
        assert_eq!(granted.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn test_resolve_for_unknown_user_is_empty() {
        let db = setup_test_db().await;
        let store = RbacStore::new();
        store.sync_vocabulary(&db).await.unwrap();

        assert!(store.resolve_roles(&db, 999).await.is_empty());
        assert!(store.resolve_permissions(&db, 999).await.is_empty());
    }

    #[tokio::test]
    async fn test_replace_role_permissions_rejects_unknown_ids_without_writing() {
        let db = setup_test_db().await;
        let store = RbacStore::new();
        store.sync_vocabulary(&db).await.unwrap();
        let agent = store.find_role_by_name(&db, "Agent").await.unwrap().unwrap();
        let before = store.role_permissions(&db, agent.id).await.unwrap();

        let result = store.replace_role_permissions(&db, agent.id, &[1, 99_999]).await;

        match result {
            Err(InternalError::Validation(err)) => {
                assert_eq!(err.fields.len(), 1);
                assert!(err.fields[0].message.contains("99999"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert_eq!(store.role_permissions(&db, agent.id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_replace_role_permissions_on_missing_role_is_not_found() {
        let db = setup_test_db().await;
        let store = RbacStore::new();

        let result = store.replace_role_permissions(&db, 42, &[]).await;

        assert!(matches!(result, Err(InternalError::NotFound { .. })));
    }
}
