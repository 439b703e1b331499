use brokerage_backend::types::internal::{HierarchyCode, Principal, RequestContext, RequestSource};
use poem::Request;

#[test]
fn test_request_context_from_request_defaults() {
    let req = Request::builder().finish();
    let ctx = RequestContext::from_request(&req);

    assert_eq!(ctx.source, RequestSource::API);
    assert!(ctx.principal.is_none());
}

#[test]
fn test_request_context_for_cli() {
    let ctx = RequestContext::for_cli("create-user");

    assert_eq!(ctx.source, RequestSource::CLI);
    assert!(ctx.ip_address.is_none());
    assert!(ctx.principal.is_none());
}

#[test]
fn test_request_context_prefers_forwarded_ip() {
    let req = Request::builder()
        .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
        .finish();
    let ctx = RequestContext::from_request(&req);

    assert_eq!(ctx.ip_address, Some("203.0.113.7".parse().unwrap()));
}

#[test]
fn test_require_principal() {
    let ctx = RequestContext::for_cli("test");
    assert!(ctx.require_principal().is_err());

    let ctx = ctx.with_principal(Principal {
        user_id: 7,
        email: "agent@example.com".to_string(),
        role: Some("Agent".to_string()),
        code: HierarchyCode::parse("AGT-100200"),
    });
    let principal = ctx.require_principal().unwrap();
    assert_eq!(principal.user_id, 7);
    assert_eq!(principal.code.as_ref().map(|c| c.as_str()), Some("AGT-100200"));
}

#[test]
fn test_request_ids_are_unique() {
    let a = RequestContext::for_cli("a");
    let b = RequestContext::for_cli("b");

    assert_ne!(a.request_id, b.request_id);
}
