//! Integration tests for registration, login, and the token lifecycle.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_register_login_and_me() {
    let app = TestApp::new().await;

    let data = app.register("alice").await;
    assert_eq!(data["user"]["username"], "alice");
    assert_eq!(data["token_type"], "Bearer");
    assert!(data["access_token"].is_string());
    assert!(data["refresh_token"].is_string());
    assert!(data["user"].get("password_hash").is_none());

    let (access, _) = app.login("alice", PASSWORD).await;
    let me = app.request("GET", "/api/v1/auth/me", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.str_at("/data/username"), "alice");

    let roles = me.body["data"]["roles"].as_array().expect("roles array");
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0]["name"], "user");
}

#[tokio::test]
async fn test_login_by_email() {
    let app = TestApp::new().await;
    app.register("alice").await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "alice@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_duplicate_conflicts() {
    let app = TestApp::new().await;
    app.register("alice").await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({
                "username": "alice",
                "email": "other@example.com",
                "password": PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "CONFLICT");
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({ "username": "al", "email": "not-an-email", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let short_password = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({ "username": "alice", "email": "alice@example.com", "password": "123" })),
            None,
        )
        .await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new().await;
    app.register("alice").await;

    let wrong_password = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "username": "alice", "password": "wrongpassword" })),
            None,
        )
        .await;
    let unknown_user = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "username": "nobody", "password": "wrongpassword" })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::new().await;

    let missing = app.request("GET", "/api/v1/auth/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.error_code(), "AUTHENTICATION");

    let garbage = app
        .request("GET", "/api/v1/auth/me", None, Some("not.a.jwt"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_query_parameter_is_accepted() {
    let app = TestApp::new().await;
    app.register("alice").await;
    let (access, _) = app.login("alice", PASSWORD).await;

    let response = app
        .request("GET", &format!("/api/v1/auth/me?token={access}"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rotates_token() {
    let app = TestApp::new().await;
    app.register("alice").await;
    let (_, refresh) = app.login("alice", PASSWORD).await;

    let rotated = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(rotated.status, StatusCode::OK);
    let new_refresh = rotated.str_at("/data/refresh_token").to_string();
    assert_ne!(new_refresh, refresh);

    let me = app
        .request(
            "GET",
            "/api/v1/auth/me",
            None,
            Some(rotated.str_at("/data/access_token")),
        )
        .await;
    assert_eq!(me.status, StatusCode::OK);

    let replay = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let app = TestApp::new().await;
    app.register("alice").await;
    let (access, refresh) = app.login("alice", PASSWORD).await;

    let logout = app
        .request(
            "POST",
            "/api/v1/auth/logout",
            Some(json!({ "refresh_token": refresh })),
            Some(&access),
        )
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let refreshed = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);

    // Access tokens stay valid until they expire.
    let me = app.request("GET", "/api/v1/auth/me", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_ignores_tokens_of_other_users() {
    let app = TestApp::new().await;
    app.register("alice").await;
    app.register("bob").await;
    let (alice_access, _) = app.login("alice", PASSWORD).await;
    let (_, bob_refresh) = app.login("bob", PASSWORD).await;

    let logout = app
        .request(
            "POST",
            "/api/v1/auth/logout",
            Some(json!({ "refresh_token": bob_refresh })),
            Some(&alice_access),
        )
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let refreshed = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": bob_refresh })),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let app = TestApp::new().await;
    // Registration issues the first refresh token.
    app.register("alice").await;
    let (access, first) = app.login("alice", PASSWORD).await;
    let (_, second) = app.login("alice", PASSWORD).await;

    let response = app
        .request("POST", "/api/v1/auth/logout-all", None, Some(&access))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["revoked"], 3);

    for token in [first, second] {
        let refreshed = app
            .request(
                "POST",
                "/api/v1/auth/refresh",
                Some(json!({ "refresh_token": token })),
                None,
            )
            .await;
        assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}
