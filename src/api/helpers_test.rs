#[cfg(test)]
mod tests {
    use crate::api::helpers::*;
    use crate::errors::ApiError;
    use crate::services::Page;
    use crate::stores::Listing;

    #[test]
    fn test_list_query_splits_filters_on_first_colon() {
        let query = list_query(
            Some("villa".to_string()),
            vec!["status:available".to_string(), "city: Lahore ".to_string(), "notes:a:b".to_string()],
            None,
            None,
            Some("2".to_string()),
            Some("10".to_string()),
        )
        .unwrap();

        assert_eq!(query.search.as_deref(), Some("villa"));
        assert_eq!(
            query.filters,
            vec![
                ("status".to_string(), "available".to_string()),
                ("city".to_string(), "Lahore".to_string()),
                ("notes".to_string(), "a:b".to_string()),
            ]
        );
        assert_eq!(query.page.as_deref(), Some("2"));
        assert_eq!(query.limit.as_deref(), Some("10"));
    }

    #[test]
    fn test_list_query_rejects_malformed_filter() {
        let result = list_query(
            None,
            vec!["status".to_string(), ":open".to_string()],
            None,
            None,
            None,
            None,
        );

        match result {
            Err(ApiError::ValidationFailed(body)) => {
                assert_eq!(body.0.status_code, 400);
                assert_eq!(body.0.fields.len(), 2);
                assert!(body.0.fields.iter().all(|f| f.field == "filter"));
            }
            _ => panic!("Expected ValidationFailed"),
        }
    }

    #[test]
    fn test_pagination_reports_total_across_pages() {
        let listing: Listing<()> = Listing {
            rows: vec![],
            total: 42,
            page: Page { page: 3, limit: 20, offset: 40 },
        };

        let meta = pagination(&listing);

        assert_eq!(meta.page, 3);
        assert_eq!(meta.limit, 20);
        assert_eq!(meta.total, 42);
    }
}
