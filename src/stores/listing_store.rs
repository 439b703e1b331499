use sea_orm::sea_query::SelectStatement;
use sea_orm::ConnectionTrait;

use crate::errors::InternalError;
use crate::services::{ListQuery, Page, QueryComposer, VisibilityScope};
use crate::types::internal::{EntityDescriptor, ScopedRow};

/// One page of scoped rows with the total matching the same filters
#[derive(Debug, Clone)]
pub struct Listing<R> {
    pub rows: Vec<R>,
    pub total: u64,
    pub page: Page,
}

/// ListingStore executes scoped listing, lookup and export statements
///
/// Every statement is composed with the requester's visibility scope, so
/// nothing here can return a row outside that scope.
#[derive(Debug, Default)]
pub struct ListingStore;

impl ListingStore {
    pub fn new() -> Self {
        Self
    }

    /// Fetch one page of `R` and the total row count under `scope`
    ///
    /// # Returns
    /// * `Ok(Listing)` - Rows of the requested page with the filtered total
    /// * `Err(InternalError::Validation)` - Unknown filter column or bad date bound
    pub async fn list<R: ScopedRow>(
        &self,
        conn: &impl ConnectionTrait,
        scope: &VisibilityScope,
        query: &ListQuery,
    ) -> Result<Listing<R>, InternalError> {
        let desc = R::KIND.descriptor();
        let composed = QueryComposer::compose(desc, scope, query)?;

        let total = Self::execute_count(conn, &composed.count, desc).await?;
        let rows = Self::fetch_rows::<R>(conn, &composed.select, "list").await?;

        tracing::debug!(
            "Listed {} {} of {} (page {})",
            rows.len(),
            desc.table,
            total,
            composed.page.page
        );

        Ok(Listing {
            rows,
            total,
            page: composed.page,
        })
    }

    /// Count rows of `desc` visible under `scope`
    pub async fn count(
        &self,
        conn: &impl ConnectionTrait,
        desc: &EntityDescriptor,
        scope: &VisibilityScope,
    ) -> Result<u64, InternalError> {
        let count = QueryComposer::compose_count(desc, scope);
        Self::execute_count(conn, &count, desc).await
    }

    /// Count rows matching `query` under `scope`, ignoring pagination
    pub async fn count_matching(
        &self,
        conn: &impl ConnectionTrait,
        desc: &EntityDescriptor,
        scope: &VisibilityScope,
        query: &ListQuery,
    ) -> Result<u64, InternalError> {
        let composed = QueryComposer::compose(desc, scope, query)?;
        Self::execute_count(conn, &composed.count, desc).await
    }

    /// Find a row by primary key, `None` when missing or out of scope
    pub async fn find_one<R: ScopedRow>(
        &self,
        conn: &impl ConnectionTrait,
        scope: &VisibilityScope,
        id: i32,
    ) -> Result<Option<R>, InternalError> {
        let select = QueryComposer::compose_find_one(R::KIND.descriptor(), scope, id);
        let mut rows = Self::fetch_rows::<R>(conn, &select, "find_one").await?;
        Ok(rows.pop())
    }

    /// Every row matching `query` under `scope`, newest first
    pub async fn export<R: ScopedRow>(
        &self,
        conn: &impl ConnectionTrait,
        scope: &VisibilityScope,
        query: &ListQuery,
    ) -> Result<Vec<R>, InternalError> {
        let select = QueryComposer::compose_export(R::KIND.descriptor(), scope, query)?;
        Self::fetch_rows::<R>(conn, &select, "export").await
    }

    async fn fetch_rows<R: ScopedRow>(
        conn: &impl ConnectionTrait,
        select: &SelectStatement,
        operation: &str,
    ) -> Result<Vec<R>, InternalError> {
        let statement = conn.get_database_backend().build(select);
        R::find_by_statement(statement)
            .all(conn)
            .await
            .map_err(|e| InternalError::database(&format!("{}_{}", operation, R::KIND), e))
    }

    async fn execute_count(
        conn: &impl ConnectionTrait,
        count: &SelectStatement,
        desc: &EntityDescriptor,
    ) -> Result<u64, InternalError> {
        let operation = format!("count_{}", desc.table);
        let row = conn
            .query_one(conn.get_database_backend().build(count))
            .await
            .map_err(|e| InternalError::database(&operation, e))?;

        let total = match row {
            Some(row) => row
                .try_get::<i64>("", "total")
                .map_err(|e| InternalError::database(&operation, e))?,
            None => 0,
        };
        Ok(u64::try_from(total).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{
        insert_brokerage, insert_notification, insert_property, new_user, setup_synced_db,
        test_credential_store,
    };
    use crate::types::dto::listing::{AgentRow, BrokerageRow, NotificationRow, PropertyRow};
    use crate::types::internal::{EntityKind, HierarchyCode};

    fn code(raw: &str) -> HierarchyCode {
        HierarchyCode::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_agent_sees_only_own_properties_with_matching_total() {
        let db = setup_synced_db().await;
        for n in 0..3 {
            insert_property(&db, &format!("PRP-10000{}", n), "Mine", Some("AGT-100200")).await;
        }
        insert_property(&db, "PRP-200000", "Theirs", Some("AGT-999999")).await;
        insert_property(&db, "PRP-300000", "Unowned", None).await;

        let scope = VisibilityScope::Agent(code("AGT-100200"));
        let listing = ListingStore::new()
            .list::<PropertyRow>(&db, &scope, &ListQuery::default())
            .await
            .unwrap();

        assert_eq!(listing.total, 3);
        assert_eq!(listing.rows.len(), 3);
        assert!(listing.rows.iter().all(|r| r.agent_code.as_deref() == Some("AGT-100200")));
    }

    #[tokio::test]
    async fn test_total_ignores_pagination() {
        let db = setup_synced_db().await;
        for n in 0..5 {
            insert_property(&db, &format!("PRP-50000{}", n), "Listing", None).await;
        }

        let query = ListQuery::default().with_page("2", "2");
        let listing = ListingStore::new()
            .list::<PropertyRow>(&db, &VisibilityScope::Unrestricted, &query)
            .await
            .unwrap();

        assert_eq!(listing.total, 5);
        assert_eq!(listing.rows.len(), 2);
        assert_eq!(listing.rows[0].property_code, "PRP-500002");
        assert_eq!(listing.page.offset, 2);
    }

    #[tokio::test]
    async fn test_page_beyond_sql_range_returns_first_page() {
        let db = setup_synced_db().await;
        for n in 0..3 {
            insert_property(&db, &format!("PRP-70000{}", n), "Listing", None).await;
        }

        let query = ListQuery::default().with_page("99999999999999999", "200");
        let listing = ListingStore::new()
            .list::<PropertyRow>(&db, &VisibilityScope::Unrestricted, &query)
            .await
            .unwrap();

        assert_eq!(listing.page.page, 1);
        assert_eq!(listing.page.offset, 0);
        assert_eq!(listing.rows.len(), 3);
        assert_eq!(listing.total, 3);
    }

    #[tokio::test]
    async fn test_manager_scope_follows_agents_hierarchy() {
        let db = setup_synced_db().await;
        let store = test_credential_store();
        let manager = store.create_user(&db, new_user("manager@example.com", 3)).await.unwrap();
        let mut agent_input = new_user("agent@example.com", 4);
        agent_input.manager_code = Some(manager.user.code.clone());
        let agent = store.create_user(&db, agent_input).await.unwrap();
        let stray = store.create_user(&db, new_user("stray@example.com", 4)).await.unwrap();

        insert_brokerage(&db, "BRK-900001", "Nadia", Some(&agent.user.code)).await;
        insert_brokerage(&db, "BRK-900002", "Omar", Some(&agent.user.code)).await;
        insert_brokerage(&db, "BRK-100003", "Imran", Some(&agent.user.code)).await;
        insert_brokerage(&db, "BRK-900004", "Sana", Some(&stray.user.code)).await;

        let scope = VisibilityScope::Manager(code(&manager.user.code));
        let query = ListQuery::default().with_search("BRK-9");
        let listing = ListingStore::new()
            .list::<BrokerageRow>(&db, &scope, &query)
            .await
            .unwrap();

        let codes: Vec<_> = listing.rows.iter().map(|r| r.brokerage_code.as_str()).collect();
        assert_eq!(codes, vec!["BRK-900001", "BRK-900002"]);
        assert_eq!(listing.total, 2);
    }

    #[tokio::test]
    async fn test_each_admin_sees_only_its_branch() {
        let db = setup_synced_db().await;
        let store = test_credential_store();
        let mut branches = Vec::new();
        for n in 1..=2 {
            let admin = store
                .create_user(&db, new_user(&format!("admin{}@example.com", n), 2))
                .await
                .unwrap();
            let mut manager_input = new_user(&format!("manager{}@example.com", n), 3);
            manager_input.admin_code = Some(admin.user.code.clone());
            let manager = store.create_user(&db, manager_input).await.unwrap();

            let mut agents = Vec::new();
            for a in 1..=2 {
                let mut agent_input = new_user(&format!("agent{}{}@example.com", n, a), 4);
                agent_input.manager_code = Some(manager.user.code.clone());
                let agent = store.create_user(&db, agent_input).await.unwrap();
                insert_property(&db, &format!("PRP-8000{}{}", n, a), "Branch", Some(&agent.user.code))
                    .await;
                agents.push(agent.user.code);
            }
            branches.push((admin.user.code, agents));
        }

        for (admin_code, agents) in &branches {
            let scope = VisibilityScope::Admin(code(admin_code));
            let listing = ListingStore::new()
                .list::<PropertyRow>(&db, &scope, &ListQuery::default())
                .await
                .unwrap();

            assert_eq!(listing.total, 2);
            assert_eq!(listing.rows.len(), 2);
            assert!(listing
                .rows
                .iter()
                .all(|r| r.agent_code.as_ref().is_some_and(|c| agents.contains(c))));
        }
    }

    #[tokio::test]
    async fn test_find_one_hides_out_of_scope_rows() {
        let db = setup_synced_db().await;
        let mine = insert_property(&db, "PRP-111111", "Mine", Some("AGT-100200")).await;
        let theirs = insert_property(&db, "PRP-222222", "Theirs", Some("AGT-300400")).await;
        let scope = VisibilityScope::Agent(code("AGT-100200"));
        let store = ListingStore::new();

        let found = store.find_one::<PropertyRow>(&db, &scope, mine.id).await.unwrap();
        let hidden = store.find_one::<PropertyRow>(&db, &scope, theirs.id).await.unwrap();

        assert_eq!(found.map(|r| r.id), Some(mine.id));
        assert!(hidden.is_none());
    }

    #[tokio::test]
    async fn test_notifications_are_newest_first() {
        let db = setup_synced_db().await;
        insert_notification(&db, "Old", Some("AGT-100200"), 1_000).await;
        insert_notification(&db, "New", Some("AGT-100200"), 3_000).await;
        insert_notification(&db, "Middle", Some("AGT-100200"), 2_000).await;

        let scope = VisibilityScope::Agent(code("AGT-100200"));
        let listing = ListingStore::new()
            .list::<NotificationRow>(&db, &scope, &ListQuery::default())
            .await
            .unwrap();

        let titles: Vec<_> = listing.rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Middle", "Old"]);
    }

    #[tokio::test]
    async fn test_agent_listing_carries_user_columns() {
        let db = setup_synced_db().await;
        let store = test_credential_store();
        let agent = store.create_user(&db, new_user("field.agent@example.com", 4)).await.unwrap();

        let listing = ListingStore::new()
            .list::<AgentRow>(&db, &VisibilityScope::Unrestricted, &ListQuery::default())
            .await
            .unwrap();

        assert_eq!(listing.total, 1);
        assert_eq!(listing.rows[0].agent_code, agent.user.code);
        assert_eq!(listing.rows[0].email, "field.agent@example.com");
    }

    #[tokio::test]
    async fn test_export_ignores_pagination_but_keeps_scope() {
        let db = setup_synced_db().await;
        for n in 0..12 {
            insert_property(&db, &format!("PRP-7000{:02}", n), "Bulk", Some("AGT-100200")).await;
        }
        insert_property(&db, "PRP-800000", "Other", Some("AGT-300400")).await;

        let scope = VisibilityScope::Agent(code("AGT-100200"));
        let rows = ListingStore::new()
            .export::<PropertyRow>(&db, &scope, &ListQuery::default().with_page("1", "5"))
            .await
            .unwrap();

        assert_eq!(rows.len(), 12);
    }

    #[tokio::test]
    async fn test_unknown_filter_is_a_validation_error() {
        let db = setup_synced_db().await;
        let query = ListQuery::default().with_filter("password_hash", "x");

        let result = ListingStore::new()
            .list::<PropertyRow>(&db, &VisibilityScope::Unrestricted, &query)
            .await;

        assert!(matches!(result, Err(InternalError::Validation(_))));
    }

    #[tokio::test]
    async fn test_count_uses_scope_only() {
        let db = setup_synced_db().await;
        insert_property(&db, "PRP-111111", "Mine", Some("AGT-100200")).await;
        insert_property(&db, "PRP-222222", "Theirs", Some("AGT-300400")).await;

        let store = ListingStore::new();
        let desc = EntityKind::Property.descriptor();
        let all = store.count(&db, desc, &VisibilityScope::Unrestricted).await.unwrap();
        let mine = store
            .count(&db, desc, &VisibilityScope::Agent(code("AGT-100200")))
            .await
            .unwrap();

        assert_eq!((all, mine), (2, 1));
    }
}
