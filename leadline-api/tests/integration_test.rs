/// Integration tests for the Leadline API
///
/// These exercise the assembled router: guard behavior on admin routes,
/// request validation, session cookie handling, and the security-header
/// layer. Everything here rejects (or degrades) before needing a reachable
/// database; database-backed flows are covered by the model unit tests.

mod common;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use common::TestContext;
use serde_json::json;
use std::net::SocketAddr;
use tower::Service as _;

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

/// Anonymous browser hitting an admin page is redirected to login
#[tokio::test]
async fn test_admin_page_redirects_anonymous_to_login() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/admin")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/admin/login"
    );
}

/// Anonymous caller hitting an admin action gets 401, not a redirect
#[tokio::test]
async fn test_admin_action_rejects_anonymous() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/admin/api/leads")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A garbage bearer token is rejected before any database access
#[tokio::test]
async fn test_admin_action_rejects_garbage_token() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/admin/api/leads")
        .header(header::AUTHORIZATION, "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Admin-only user management is guarded the same way
#[tokio::test]
async fn test_user_management_rejects_anonymous() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/admin/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "email": "new@example.com",
                "name": "New User",
                "role": "staff",
                "password": "longenough1"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Login payload validation fires before any credential check
#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .extension(ConnectInfo(peer()))
        .body(Body::from(
            json!({ "email": "not-an-email", "password": "whatever1" }).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

/// Analytics beacon validates its payload before recording anything
#[tokio::test]
async fn test_analytics_beacon_rejects_empty_kind() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/analytics/events")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "kind": "" }).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

/// Logout clears the session cookie without needing a session
#[tokio::test]
async fn test_logout_clears_cookie() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("logout must set the session cookie");

    assert!(cookie.starts_with("leadline_session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

/// Security headers are applied to every response
#[tokio::test]
async fn test_security_headers_present() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert_eq!(
        headers.get("Referrer-Policy").unwrap(),
        "strict-origin-when-cross-origin"
    );
    // Non-HTTPS test config: no HSTS
    assert!(headers.get("Strict-Transport-Security").is_none());
}

/// A rejected contact submission must not consume the cooldown window
///
/// Both requests are invalid (no email or phone). If the throttle gate ran
/// before validation, the first attempt would record an acceptance and the
/// second would come back 429 instead of the same 400.
#[tokio::test]
async fn test_rejected_contact_does_not_burn_cooldown() {
    let ctx = TestContext::new();

    for _ in 0..2 {
        let request = Request::builder()
            .method("POST")
            .uri("/contact")
            .header(header::CONTENT_TYPE, "application/json")
            .extension(ConnectInfo(peer()))
            .body(Body::from(
                json!({ "name": "Sam Visitor", "inquiry_type": "quote" }).to_string(),
            ))
            .unwrap();

        let response = ctx.app.clone().call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

/// Unknown routes fall through to 404
#[tokio::test]
async fn test_unknown_route_is_404() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/no-such-route")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
