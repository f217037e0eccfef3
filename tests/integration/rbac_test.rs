//! Integration tests for permission and role requirements on admin routes.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_regular_user_is_forbidden() {
    let app = TestApp::new().await;
    app.register("alice").await;
    let (access, _) = app.login("alice", PASSWORD).await;

    let response = app.request("GET", "/api/v1/users", None, Some(&access)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "AUTHORIZATION");

    let logs = app
        .request("GET", "/api/v1/security/failed-logins", None, Some(&access))
        .await;
    assert_eq!(logs.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_role_grants_access() {
    let app = TestApp::new().await;
    let (_, access) = app.admin("root").await;
    app.register("alice").await;

    let response = app
        .request("GET", "/api/v1/users?page=1&per_page=10", None, Some(&access))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["total_items"], 2);

    let roles = app.request("GET", "/api/v1/roles", None, Some(&access)).await;
    assert_eq!(roles.status, StatusCode::OK);
    assert_eq!(roles.body["data"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_role_assignment_takes_effect_on_next_request() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin("root").await;
    let alice = app.register("alice").await;
    let alice_id = alice["user"]["id"].as_str().expect("id").to_string();
    let (alice_token, _) = app.login("alice", PASSWORD).await;

    let before = app
        .request("GET", "/api/v1/users", None, Some(&alice_token))
        .await;
    assert_eq!(before.status, StatusCode::FORBIDDEN);

    let roles = app.request("GET", "/api/v1/roles", None, Some(&admin_token)).await;
    let moderator_id = roles.body["data"]
        .as_array()
        .and_then(|roles| roles.iter().find(|r| r["name"] == "moderator"))
        .and_then(|r| r["id"].as_str())
        .expect("moderator role")
        .to_string();

    let assigned = app
        .request(
            "POST",
            &format!("/api/v1/users/{alice_id}/roles"),
            Some(json!({ "role_ids": [moderator_id] })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(assigned.status, StatusCode::OK);

    // Permissions are loaded per request, so the old token sees the new role.
    let after = app
        .request("GET", "/api/v1/users", None, Some(&alice_token))
        .await;
    assert_eq!(after.status, StatusCode::OK);

    // Moderators can read but not delete.
    let delete = app
        .request(
            "DELETE",
            &format!("/api/v1/users/{alice_id}"),
            None,
            Some(&alice_token),
        )
        .await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_assignment_requires_admin_role() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let alice_id = alice["user"]["id"].as_str().expect("id").to_string();
    let (alice_token, _) = app.login("alice", PASSWORD).await;

    let response = app
        .request(
            "POST",
            &format!("/api/v1/users/{alice_id}/roles"),
            Some(json!({ "role_ids": [] })),
            Some(&alice_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_disabled_user_is_rejected() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin("root").await;
    let alice = app.register("alice").await;
    let alice_id = alice["user"]["id"].as_str().expect("id").to_string();
    let (alice_token, alice_refresh) = app.login("alice", PASSWORD).await;

    let disabled = app
        .request(
            "PUT",
            &format!("/api/v1/users/{alice_id}"),
            Some(json!({ "is_active": false })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(disabled.status, StatusCode::OK);
    assert_eq!(disabled.body["data"]["is_active"], false);

    let me = app
        .request("GET", "/api/v1/auth/me", None, Some(&alice_token))
        .await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    let refreshed = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": alice_refresh })),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);

    let login = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "username": "alice", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = TestApp::new().await;
    let (admin_id, admin_token) = app.admin("root").await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/users/{admin_id}"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_default_roles_cannot_be_deleted() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin("root").await;

    let roles = app.request("GET", "/api/v1/roles", None, Some(&admin_token)).await;
    let user_role_id = roles.body["data"]
        .as_array()
        .and_then(|roles| roles.iter().find(|r| r["name"] == "user"))
        .and_then(|r| r["id"].as_str())
        .expect("user role")
        .to_string();

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/roles/{user_role_id}"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_custom_role_lifecycle() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin("root").await;

    let permission = app
        .request(
            "POST",
            "/api/v1/permissions",
            Some(json!({
                "name": "reports.read",
                "resource": "reports",
                "action": "read",
                "description": "Read reports",
            })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(permission.status, StatusCode::CREATED);
    let permission_id = permission.str_at("/data/id").to_string();

    let duplicate = app
        .request(
            "POST",
            "/api/v1/permissions",
            Some(json!({ "name": "reports.view", "resource": "reports", "action": "read" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let role = app
        .request(
            "POST",
            "/api/v1/roles",
            Some(json!({
                "name": "analyst",
                "description": "Reads reports",
                "permission_ids": [permission_id],
            })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(role.status, StatusCode::CREATED);
    let role_id = role.str_at("/data/id").to_string();
    assert_eq!(role.body["data"]["permissions"][0]["name"], "reports.read");

    let deleted = app
        .request(
            "DELETE",
            &format!("/api/v1/roles/{role_id}"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = app
        .request(
            "GET",
            &format!("/api/v1/roles/{role_id}"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_is_a_validation_error() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin("root").await;

    let response = app
        .request("GET", "/api/v1/users/not-a-uuid", None, Some(&admin_token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
