use chrono::NaiveDate;
use sea_orm::sea_query::{
    Alias, Condition, Expr, JoinType, Order, Query, SelectStatement, SimpleExpr, Value,
};

use crate::errors::internal::ValidationError;
use crate::services::visibility_scoper::{Comparator, FilterValue, Predicate, VisibilityScope};
use crate::types::internal::{EntityDescriptor, ListingOrder};

/// Largest page a caller may request
pub const MAX_LIMIT: u64 = 200;

/// Upper bound on rows handed to an export renderer
pub const MAX_EXPORT_ROWS: u64 = 10_000;

/// Caller-supplied listing parameters, still in their raw form
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    /// `(column, value)` equality filters, checked against the entity whitelist
    pub filters: Vec<(String, String)>,
    /// Inclusive lower bound: Unix seconds or `YYYY-MM-DD`
    pub created_from: Option<String>,
    /// Inclusive upper bound: Unix seconds or `YYYY-MM-DD` (whole day)
    pub created_to: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_filter(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn with_page(mut self, page: impl Into<String>, limit: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self.limit = Some(limit.into());
        self
    }

    pub fn with_created_range(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.created_from = from.map(str::to_string);
        self.created_to = to.map(str::to_string);
        self
    }
}

/// Resolved pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    /// Resolve raw pagination input
    ///
    /// Malformed or out-of-range values fall back to page 1 and the entity's
    /// default limit. Limits above `MAX_LIMIT` are capped. A page whose offset
    /// would not fit a signed 64-bit SQL integer is out of range.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>, default_limit: u64) -> Self {
        let limit = limit
            .and_then(|l| l.trim().parse::<u64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(default_limit)
            .min(MAX_LIMIT);
        let (page, offset) = page
            .and_then(|p| p.trim().parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .and_then(|p| Self::offset_for(p, limit).map(|offset| (p, offset)))
            .unwrap_or((1, 0));

        Self { page, limit, offset }
    }

    fn offset_for(page: u64, limit: u64) -> Option<u64> {
        (page - 1)
            .checked_mul(limit)
            .filter(|offset| *offset <= i64::MAX as u64)
    }
}

/// A paginated data statement and the count statement sharing its WHERE clause
#[derive(Debug, Clone)]
pub struct ComposedQuery {
    pub select: SelectStatement,
    pub count: SelectStatement,
    pub page: Page,
}

/// Builds listing statements from an entity descriptor, a visibility scope and
/// caller filters
///
/// WHERE fragments are joined with AND in a fixed order: visibility, the search
/// OR-group, equality filters, then the creation range. The count statement is
/// built from the same `Condition` value, so both bind the same parameters and
/// the data statement only adds LIMIT and OFFSET at the end.
pub struct QueryComposer;

impl QueryComposer {
    /// Compose the paginated listing and its count
    ///
    /// # Returns
    /// * `Err(ValidationError)` - Unknown filter column or malformed date bound
    pub fn compose(
        desc: &EntityDescriptor,
        scope: &VisibilityScope,
        query: &ListQuery,
    ) -> Result<ComposedQuery, ValidationError> {
        let condition = Self::condition(desc, scope, query)?;
        let page = Page::from_raw(query.page.as_deref(), query.limit.as_deref(), desc.default_limit);

        let mut select = Self::base_select(desc);
        Self::apply_condition(&mut select, &condition);
        Self::apply_order(&mut select, desc, desc.listing_order);
        select.limit(page.limit).offset(page.offset);

        let mut count = Self::count_select(desc);
        Self::apply_condition(&mut count, &condition);

        tracing::trace!(
            "Composed {} listing: page={}, limit={}",
            desc.table,
            page.page,
            page.limit
        );

        Ok(ComposedQuery {
            select,
            count,
            page,
        })
    }

    /// Count rows visible under `scope` with no further filters
    pub fn compose_count(desc: &EntityDescriptor, scope: &VisibilityScope) -> SelectStatement {
        let mut count = Self::count_select(desc);
        Self::apply_condition(&mut count, &Self::visibility(desc, scope));
        count
    }

    /// Compose a lookup of one row by primary key, restricted to `scope`
    pub fn compose_find_one(
        desc: &EntityDescriptor,
        scope: &VisibilityScope,
        id: i32,
    ) -> SelectStatement {
        let condition = Self::visibility(desc, scope).add(
            Expr::col((Alias::new(desc.alias), Alias::new(desc.primary_key))).eq(id),
        );

        let mut select = Self::base_select(desc);
        select.cond_where(condition).limit(1);
        select
    }

    /// Compose an export feed: same filters as a listing, no pagination,
    /// newest first
    pub fn compose_export(
        desc: &EntityDescriptor,
        scope: &VisibilityScope,
        query: &ListQuery,
    ) -> Result<SelectStatement, ValidationError> {
        let condition = Self::condition(desc, scope, query)?;

        let mut select = Self::base_select(desc);
        Self::apply_condition(&mut select, &condition);
        Self::apply_order(&mut select, desc, ListingOrder::CreatedDesc);
        select.limit(MAX_EXPORT_ROWS);
        Ok(select)
    }

    fn base_select(desc: &EntityDescriptor) -> SelectStatement {
        let mut select = Query::select();
        select.from_as(Alias::new(desc.table), Alias::new(desc.alias));

        for column in desc.columns {
            select.column((Alias::new(desc.alias), Alias::new(*column)));
        }
        for join in desc.joins {
            for column in join.selected {
                select.column((Alias::new(join.alias), Alias::new(*column)));
            }
        }

        Self::apply_joins(&mut select, desc);
        select
    }

    fn count_select(desc: &EntityDescriptor) -> SelectStatement {
        let mut count = Query::select();
        count
            .from_as(Alias::new(desc.table), Alias::new(desc.alias))
            .expr_as(
                Expr::col((Alias::new(desc.alias), Alias::new(desc.primary_key))).count(),
                Alias::new("total"),
            );
        Self::apply_joins(&mut count, desc);
        count
    }

    fn apply_joins(select: &mut SelectStatement, desc: &EntityDescriptor) {
        for join in desc.joins {
            select.join_as(
                JoinType::LeftJoin,
                Alias::new(join.table),
                Alias::new(join.alias),
                Expr::col((Alias::new(join.alias), Alias::new(join.foreign_column)))
                    .equals((Alias::new(desc.alias), Alias::new(join.local_column))),
            );
        }
    }

    fn apply_condition(select: &mut SelectStatement, condition: &Condition) {
        if !condition.is_empty() {
            select.cond_where(condition.clone());
        }
    }

    fn apply_order(select: &mut SelectStatement, desc: &EntityDescriptor, order: ListingOrder) {
        let pk = (Alias::new(desc.alias), Alias::new(desc.primary_key));
        match order {
            ListingOrder::PrimaryKeyAsc => {
                select.order_by(pk, Order::Asc);
            }
            ListingOrder::CreatedDesc => {
                select
                    .order_by(
                        (Alias::new(desc.alias), Alias::new(desc.created_column)),
                        Order::Desc,
                    )
                    .order_by(pk, Order::Desc);
            }
        }
    }

    fn visibility(desc: &EntityDescriptor, scope: &VisibilityScope) -> Condition {
        scope
            .predicates(desc)
            .iter()
            .fold(Condition::all(), |cond, p| cond.add(Self::predicate_expr(p)))
    }

    fn condition(
        desc: &EntityDescriptor,
        scope: &VisibilityScope,
        query: &ListQuery,
    ) -> Result<Condition, ValidationError> {
        let mut errors = ValidationError::default();
        let mut condition = Self::visibility(desc, scope);

        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            let group = desc.search_columns.iter().fold(Condition::any(), |group, &(alias, column)| {
                group.add(Self::predicate_expr(&Predicate {
                    alias,
                    column,
                    comparator: Comparator::Like,
                    value: FilterValue::Text(pattern.clone()),
                }))
            });
            condition = condition.add(group);
        }

        for (name, value) in &query.filters {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match desc.filterable.iter().copied().find(|c| *c == name.as_str()) {
                Some(column) => {
                    condition = condition.add(Self::predicate_expr(&Predicate::eq_text(
                        desc.alias, column, value,
                    )));
                }
                None => errors.push(name.clone(), format!("cannot filter {} by this field", desc.table)),
            }
        }

        let created_from = Self::parse_bound(query.created_from.as_deref(), false)
            .map_err(|msg| errors.push("created_from", msg))
            .ok()
            .flatten();
        let created_to = Self::parse_bound(query.created_to.as_deref(), true)
            .map_err(|msg| errors.push("created_to", msg))
            .ok()
            .flatten();

        errors.into_result()?;

        for (bound, comparator) in [(created_from, Comparator::Gte), (created_to, Comparator::Lte)] {
            if let Some(ts) = bound {
                condition = condition.add(Self::predicate_expr(&Predicate {
                    alias: desc.alias,
                    column: desc.created_column,
                    comparator,
                    value: FilterValue::Int(ts),
                }));
            }
        }

        Ok(condition)
    }

    /// Parse a creation bound; a bare date covers the whole day
    fn parse_bound(raw: Option<&str>, end_of_day: bool) -> Result<Option<i64>, String> {
        let raw = match raw.map(str::trim).filter(|r| !r.is_empty()) {
            Some(raw) => raw,
            None => return Ok(None),
        };

        if let Ok(ts) = raw.parse::<i64>() {
            return Ok(Some(ts));
        }

        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| "expected Unix seconds or YYYY-MM-DD".to_string())?;
        let time = if end_of_day {
            date.and_hms_opt(23, 59, 59)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        time.map(|t| Some(t.and_utc().timestamp()))
            .ok_or_else(|| "date out of range".to_string())
    }

    fn predicate_expr(predicate: &Predicate) -> SimpleExpr {
        let col = Expr::col((Alias::new(predicate.alias), Alias::new(predicate.column)));
        let value: Value = match &predicate.value {
            FilterValue::Text(text) => text.clone().into(),
            FilterValue::Int(int) => (*int).into(),
        };
        match predicate.comparator {
            Comparator::Eq => col.eq(value),
            Comparator::Like => match &predicate.value {
                FilterValue::Text(pattern) => col.like(pattern.as_str()),
                FilterValue::Int(_) => col.eq(value),
            },
            Comparator::Gte => col.gte(value),
            Comparator::Lte => col.lte(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::internal::{EntityKind, HierarchyCode};
    use sea_orm::sea_query::SqliteQueryBuilder;

    fn agent_scope(code: &str) -> VisibilityScope {
        VisibilityScope::Agent(HierarchyCode::parse(code).unwrap())
    }

    fn manager_scope(code: &str) -> VisibilityScope {
        VisibilityScope::Manager(HierarchyCode::parse(code).unwrap())
    }

    fn where_clause(sql: &str) -> &str {
        let start = sql.find(" WHERE ").map(|i| i + 7).unwrap_or(sql.len());
        let rest = &sql[start..];
        let end = rest.find(" ORDER BY").or_else(|| rest.find(" LIMIT")).unwrap_or(rest.len());
        &rest[..end]
    }

    #[test]
    fn test_count_and_data_share_where_clause_and_values() {
        let desc = EntityKind::Brokerage.descriptor();
        let query = ListQuery::default()
            .with_search("BRK-9")
            .with_filter("status", "open")
            .with_created_range(Some("1700000000"), Some("2024-01-31"))
            .with_page("3", "25");

        let composed = QueryComposer::compose(desc, &manager_scope("MNG-300400"), &query).unwrap();
        let (data_sql, data_values) = composed.select.build(SqliteQueryBuilder);
        let (count_sql, count_values) = composed.count.build(SqliteQueryBuilder);

        assert_eq!(where_clause(&data_sql), where_clause(&count_sql));
        assert_eq!(data_values.0.len(), count_values.0.len() + 2);
        assert_eq!(&data_values.0[..count_values.0.len()], &count_values.0[..]);
        assert_eq!(
            &data_values.0[count_values.0.len()..],
            &[Value::BigUnsigned(Some(25)), Value::BigUnsigned(Some(50))]
        );
    }

    #[test]
    fn test_where_fragments_follow_visibility_search_filter_range_order() {
        let desc = EntityKind::Brokerage.descriptor();
        let query = ListQuery::default()
            .with_search("BRK-9")
            .with_filter("status", "open")
            .with_created_range(Some("100"), Some("200"));

        let composed = QueryComposer::compose(desc, &manager_scope("MNG-300400"), &query).unwrap();
        let (sql, values) = composed.count.build(SqliteQueryBuilder);
        let clause = where_clause(&sql);

        let visibility = clause.find(r#""ag"."manager_code" = ?"#).unwrap();
        let search = clause.find(r#""b"."brokerage_code" LIKE ?"#).unwrap();
        let filter = clause.find(r#""b"."status" = ?"#).unwrap();
        let range = clause.find(r#""b"."created_at" >= ?"#).unwrap();
        assert!(visibility < search && search < filter && filter < range);
        assert!(clause.contains(r#""b"."client_name" LIKE ? OR "b"."property_code" LIKE ?"#));

        let expected: Vec<Value> = vec![
            "MNG-300400".to_string().into(),
            "%BRK-9%".to_string().into(),
            "%BRK-9%".to_string().into(),
            "%BRK-9%".to_string().into(),
            "open".to_string().into(),
            100i64.into(),
            200i64.into(),
        ];
        assert_eq!(values.0, expected);
    }

    #[test]
    fn test_unrestricted_scope_without_filters_has_no_where() {
        let desc = EntityKind::Property.descriptor();

        let composed =
            QueryComposer::compose(desc, &VisibilityScope::Unrestricted, &ListQuery::default())
                .unwrap();
        let (count_sql, count_values) = composed.count.build(SqliteQueryBuilder);

        assert!(!count_sql.contains("WHERE"));
        assert!(count_values.0.is_empty());
    }

    #[test]
    fn test_agent_scope_filters_on_entity_alias() {
        let desc = EntityKind::Property.descriptor();

        let composed =
            QueryComposer::compose(desc, &agent_scope("AGT-100200"), &ListQuery::default())
                .unwrap();
        let (sql, _) = composed.select.build(SqliteQueryBuilder);

        assert!(sql.contains(r#"LEFT JOIN "agents" AS "ag" ON "ag"."agent_code" = "p"."agent_code""#));
        assert_eq!(where_clause(&sql), r#""p"."agent_code" = ?"#);
        assert!(sql.contains(r#"ORDER BY "p"."id" ASC"#));
    }

    #[test]
    fn test_blank_search_and_filter_values_are_ignored() {
        let desc = EntityKind::Property.descriptor();
        let query = ListQuery::default().with_search("   ").with_filter("status", "");

        let composed =
            QueryComposer::compose(desc, &VisibilityScope::Unrestricted, &query).unwrap();
        let (sql, _) = composed.count.build(SqliteQueryBuilder);

        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn test_unknown_filter_column_fails_validation() {
        let desc = EntityKind::Property.descriptor();
        let query = ListQuery::default()
            .with_filter("password_hash", "x")
            .with_filter("status", "available");

        let err = QueryComposer::compose(desc, &VisibilityScope::Unrestricted, &query).unwrap_err();

        assert_eq!(err.fields.len(), 1);
        assert_eq!(err.fields[0].field, "password_hash");
    }

    #[test]
    fn test_malformed_dates_fail_validation() {
        let desc = EntityKind::Visit.descriptor();
        let query = ListQuery::default().with_created_range(Some("yesterday"), Some("2024-13-01"));

        let err = QueryComposer::compose(desc, &VisibilityScope::Unrestricted, &query).unwrap_err();

        let fields: Vec<_> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["created_from", "created_to"]);
    }

    #[test]
    fn test_date_bounds_cover_whole_days() {
        assert_eq!(QueryComposer::parse_bound(Some("2024-01-01"), false), Ok(Some(1704067200)));
        assert_eq!(QueryComposer::parse_bound(Some("2024-01-01"), true), Ok(Some(1704153599)));
        assert_eq!(QueryComposer::parse_bound(Some(" "), true), Ok(None));
    }

    #[test]
    fn test_page_from_raw_falls_back_to_defaults() {
        assert_eq!(Page::from_raw(None, None, 10), Page { page: 1, limit: 10, offset: 0 });
        assert_eq!(Page::from_raw(Some("abc"), Some("x"), 10), Page { page: 1, limit: 10, offset: 0 });
        assert_eq!(Page::from_raw(Some("0"), Some("0"), 10), Page { page: 1, limit: 10, offset: 0 });
        assert_eq!(Page::from_raw(Some("-2"), Some("-5"), 10), Page { page: 1, limit: 10, offset: 0 });
        assert_eq!(Page::from_raw(Some("3"), Some("20"), 10), Page { page: 3, limit: 20, offset: 40 });
        assert_eq!(Page::from_raw(Some("2"), Some("5000"), 10), Page { page: 2, limit: MAX_LIMIT, offset: MAX_LIMIT });
    }

    #[test]
    fn test_page_with_offset_past_i64_falls_back_to_first_page() {
        assert_eq!(
            Page::from_raw(Some("99999999999999999"), Some("200"), 10),
            Page { page: 1, limit: 200, offset: 0 }
        );
        assert_eq!(
            Page::from_raw(Some(&u64::MAX.to_string()), Some("1"), 10),
            Page { page: 1, limit: 1, offset: 0 }
        );

        let largest = (i64::MAX as u64) / 200 + 1;
        let page = Page::from_raw(Some(&largest.to_string()), Some("200"), 10);
        assert_eq!(page.page, largest);
        assert!(page.offset <= i64::MAX as u64);
    }

    #[test]
    fn test_notifications_order_newest_first() {
        let desc = EntityKind::Notification.descriptor();

        let composed =
            QueryComposer::compose(desc, &VisibilityScope::Unrestricted, &ListQuery::default())
                .unwrap();
        let (sql, _) = composed.select.build(SqliteQueryBuilder);

        assert!(sql.contains(r#"ORDER BY "n"."created_at" DESC, "n"."id" DESC"#));
    }

    #[test]
    fn test_export_has_no_pagination_and_orders_newest_first() {
        let desc = EntityKind::Property.descriptor();
        let query = ListQuery::default().with_page("4", "2");

        let select =
            QueryComposer::compose_export(desc, &agent_scope("AGT-100200"), &query).unwrap();
        let (sql, values) = select.build(SqliteQueryBuilder);

        assert!(sql.contains(r#"ORDER BY "p"."created_at" DESC, "p"."id" DESC"#));
        assert!(!sql.contains("OFFSET"));
        assert_eq!(values.0.last(), Some(&Value::BigUnsigned(Some(MAX_EXPORT_ROWS))));
    }

    #[test]
    fn test_find_one_keeps_visibility_predicate() {
        let desc = EntityKind::Property.descriptor();

        let select = QueryComposer::compose_find_one(desc, &agent_scope("AGT-100200"), 7);
        let (sql, values) = select.build(SqliteQueryBuilder);

        assert!(sql.contains(r#""p"."agent_code" = ? AND "p"."id" = ?"#));
        assert_eq!(values.0[0], Value::String(Some(Box::new("AGT-100200".to_string()))));
        assert_eq!(values.0[1], Value::Int(Some(7)));
    }

    #[test]
    fn test_agent_listing_selects_joined_user_columns() {
        let desc = EntityKind::Agent.descriptor();

        let composed =
            QueryComposer::compose(desc, &manager_scope("MNG-300400"), &ListQuery::default().with_search("ali"))
                .unwrap();
        let (sql, _) = composed.select.build(SqliteQueryBuilder);

        assert!(sql.contains(r#""u"."name", "u"."email""#));
        assert!(sql.contains(r#"LEFT JOIN "users" AS "u" ON "u"."id" = "a"."user_id""#));
        assert!(sql.contains(r#""a"."manager_code" = ?"#));
        assert!(sql.contains(r#""u"."email" LIKE ?"#));
    }
}
