/// Integration tests for session resolution, sign-up, login and logout

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{access_cookie, body_json, set_cookies, TestContext};
use std::sync::atomic::Ordering;

fn cookie_request(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();

    let response = ctx.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "memory");
    assert!(body.get("database").is_none());
}

#[tokio::test]
async fn test_session_anonymous_and_signed_in() {
    let ctx = TestContext::new();

    let body = body_json(ctx.get("/session", None).await).await;
    assert!(body["session"].is_null());

    let (user, token) = ctx.auth.issue_token("alice@example.com");
    let body = body_json(ctx.get("/session", Some(&token)).await).await;
    assert_eq!(body["session"]["user"]["id"], user.id.to_string());
    assert_eq!(body["session"]["user"]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_expired_access_token_is_refreshed() {
    let ctx = TestContext::new();
    let (user, _) = ctx.auth.issue_token("alice@example.com");
    let refresh = ctx.auth.issue_refresh_token(&user);

    let cookie = format!("tb-access-token=stale; tb-refresh-token={}", refresh);
    let response = ctx.call(cookie_request("/", &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    let access = cookies
        .iter()
        .find(|c| c.starts_with("tb-access-token="))
        .unwrap();
    assert!(!access.starts_with("tb-access-token=stale"));
    assert!(access.contains("HttpOnly"));
    assert!(cookies
        .iter()
        .any(|c| c.starts_with("tb-refresh-token=refresh-") && !c.contains(&refresh)));

    let body = body_json(response).await;
    assert_eq!(body["user"]["id"], user.id.to_string());
}

#[tokio::test]
async fn test_rejected_refresh_clears_cookies() {
    let ctx = TestContext::new();

    let response = ctx
        .call(cookie_request(
            "/",
            "tb-access-token=stale; tb-refresh-token=revoked",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
}

#[tokio::test]
async fn test_unreachable_provider_keeps_cookies() {
    let ctx = TestContext::new();
    let (_, token) = ctx.auth.issue_token("alice@example.com");
    ctx.auth.unreachable.store(true, Ordering::SeqCst);

    let response = ctx.get("/", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_provider_outage_keeps_cookies() {
    for status in [503, 500, 429] {
        let ctx = TestContext::new();
        let (user, token) = ctx.auth.issue_token("alice@example.com");
        let refresh = ctx.auth.issue_refresh_token(&user);
        ctx.auth.failing_status.store(status, Ordering::SeqCst);

        let cookie = format!("tb-access-token={}; tb-refresh-token={}", token, refresh);
        let response = ctx.call(cookie_request("/tasks", &cookie)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "status {}", status);
        assert!(set_cookies(&response).is_empty(), "status {}", status);

        // The session still works once the provider recovers.
        ctx.auth.failing_status.store(0, Ordering::SeqCst);
        let response = ctx.call(cookie_request("/tasks", &cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_home_redirects_anonymous() {
    let ctx = TestContext::new();

    let response = ctx.get("/", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn test_guest_pages_redirect_signed_in_users() {
    let ctx = TestContext::new();
    let (_, token) = ctx.auth.issue_token("alice@example.com");

    for page in ["/login", "/signup"] {
        let response = ctx.get(page, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

        let response = ctx.get(page, None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_signup_password_mismatch() {
    let ctx = TestContext::new();

    let response = ctx
        .post_form(
            "/signup",
            None,
            "email=new%40example.com&password=secret1&confirmPassword=secret2",
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    let messages = body["errors"]["confirmPassword"].as_array().unwrap();
    assert!(messages.iter().any(|m| m == "Passwords do not match"));
    assert_eq!(body["data"]["email"], "new@example.com");
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("confirmPassword").is_none());
}

#[tokio::test]
async fn test_signup_signs_in() {
    let ctx = TestContext::new();

    let response = ctx
        .post_form(
            "/signup",
            None,
            "email=new%40example.com&password=secret1&confirmPassword=secret1",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("tb-access-token=access-")));
    assert!(cookies.iter().any(|c| c.starts_with("tb-refresh-token=refresh-")));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["signed_in"], true);
    assert_eq!(body["message"], "Account created successfully");
}

#[tokio::test]
async fn test_signup_existing_account() {
    let ctx = TestContext::new();
    ctx.auth.add_account("taken@example.com", "secret1");

    let response = ctx
        .post_form(
            "/signup",
            None,
            "email=taken%40example.com&password=secret1&confirmPassword=secret1",
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookies(&response).is_empty());

    let body = body_json(response).await;
    assert_eq!(body["error"], "Authentication Error");
    assert_eq!(
        body["message"],
        "An account with this email already exists. Please log in instead."
    );
    assert_eq!(body["data"]["email"], "taken@example.com");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let ctx = TestContext::new();
    ctx.auth.add_account("alice@example.com", "right-password");

    let response = ctx
        .post_form(
            "/login",
            None,
            "email=alice%40example.com&password=wrong-password",
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        "Invalid email or password. Please check your credentials and try again."
    );
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_login_network_failure() {
    let ctx = TestContext::new();
    ctx.auth.add_account("alice@example.com", "secret1");
    ctx.auth.unreachable.store(true, Ordering::SeqCst);

    let response = ctx
        .post_form("/login", None, "email=alice%40example.com&password=secret1")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        "Network error. Please check your internet connection and try again."
    );
}

#[tokio::test]
async fn test_login_then_home() {
    let ctx = TestContext::new();
    let identity = ctx.auth.add_account("alice@example.com", "secret1");

    let response = ctx
        .post_form("/login", None, "email=alice%40example.com&password=secret1")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let access = set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with("tb-access-token="))
        .unwrap();
    let cookie = access.split(';').next().unwrap().to_string();

    let response = ctx.call(cookie_request("/", &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["id"], identity.id.to_string());
}

#[tokio::test]
async fn test_logout_revokes_and_clears() {
    let ctx = TestContext::new();
    let (_, token) = ctx.auth.issue_token("alice@example.com");

    let response = ctx
        .call(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header(header::COOKIE, access_cookie(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    assert!(!ctx.auth.is_active(&token));
}

#[tokio::test]
async fn test_security_headers_present() {
    let ctx = TestContext::new();

    let response = ctx.get("/health", None).await;
    let headers = response.headers();

    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("strict-transport-security").is_none());
}
