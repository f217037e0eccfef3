//! Integration tests for the admin catalogue endpoints: user listing
//! filters and pagination bounds, permission updates and deletion.

mod helpers;

use axum::http::StatusCode;
use serde_json::{Value, json};

use helpers::TestApp;

fn usernames(body: &Value) -> Vec<String> {
    body["data"]["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|u| u["username"].as_str().map(String::from))
        .collect()
}

#[tokio::test]
async fn test_user_list_filters_by_active_and_search() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin("root").await;
    app.register("alice").await;
    app.register("alfred").await;
    let bob = app.register("bob").await;
    let bob_id = bob["user"]["id"].as_str().expect("id").to_string();

    let disabled = app
        .request(
            "PUT",
            &format!("/api/v1/users/{bob_id}"),
            Some(json!({ "is_active": false })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(disabled.status, StatusCode::OK);

    let inactive = app
        .request("GET", "/api/v1/users?active=false", None, Some(&admin_token))
        .await;
    assert_eq!(inactive.status, StatusCode::OK);
    assert_eq!(usernames(&inactive.body), vec!["bob"]);
    assert_eq!(inactive.body["data"]["total_items"], 1);

    let search = app
        .request(
            "GET",
            "/api/v1/users?search=AL&active=true&page=1&per_page=10",
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(search.status, StatusCode::OK);
    let mut found = usernames(&search.body);
    found.sort();
    assert_eq!(found, vec!["alfred", "alice"]);

    // Matches on email as well as username.
    let by_email = app
        .request(
            "GET",
            "/api/v1/users?search=bob@example",
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(usernames(&by_email.body), vec!["bob"]);

    let wildcard = app
        .request("GET", "/api/v1/users?search=%25", None, Some(&admin_token))
        .await;
    assert_eq!(wildcard.body["data"]["total_items"], 0);
}

#[tokio::test]
async fn test_user_list_with_huge_page_is_empty() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin("root").await;

    let response = app
        .request(
            "GET",
            "/api/v1/users?page=18446744073709551615&per_page=100",
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["items"], json!([]));
    assert_eq!(response.body["data"]["total_items"], 1);
}

#[tokio::test]
async fn test_permission_update_and_delete() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin("root").await;

    let created = app
        .request(
            "POST",
            "/api/v1/permissions",
            Some(json!({ "name": "reports.read", "resource": "reports", "action": "read" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.str_at("/data/id").to_string();
    let path = format!("/api/v1/permissions/{id}");

    let updated = app
        .request(
            "PUT",
            &path,
            Some(json!({ "name": "reports.view", "description": "View reports" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.str_at("/data/name"), "reports.view");
    assert_eq!(updated.str_at("/data/action"), "read");
    assert_eq!(updated.str_at("/data/description"), "View reports");

    let clash = app
        .request(
            "PUT",
            &path,
            Some(json!({ "name": "users.read" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(clash.status, StatusCode::CONFLICT);

    let pair_clash = app
        .request(
            "PUT",
            &path,
            Some(json!({ "resource": "users" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(pair_clash.status, StatusCode::CONFLICT);

    let deleted = app.request("DELETE", &path, None, Some(&admin_token)).await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = app.request("GET", &path, None, Some(&admin_token)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let again = app.request("DELETE", &path, None, Some(&admin_token)).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_permission_granted_to_role_cannot_be_deleted() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin("root").await;

    let permissions = app
        .request("GET", "/api/v1/permissions", None, Some(&admin_token))
        .await;
    let users_read = permissions.body["data"]
        .as_array()
        .and_then(|all| all.iter().find(|p| p["name"] == "users.read"))
        .and_then(|p| p["id"].as_str())
        .expect("users.read seeded")
        .to_string();

    let refused = app
        .request(
            "DELETE",
            &format!("/api/v1/permissions/{users_read}"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(refused.status, StatusCode::CONFLICT);
    assert_eq!(refused.error_code(), "CONFLICT");

    let still_there = app
        .request(
            "GET",
            &format!("/api/v1/permissions/{users_read}"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(still_there.status, StatusCode::OK);
}

#[tokio::test]
async fn test_permission_changes_require_catalogue_permissions() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin("root").await;
    app.register("alice").await;
    let (alice_token, _) = app.login("alice", helpers::PASSWORD).await;

    let permissions = app
        .request("GET", "/api/v1/permissions", None, Some(&admin_token))
        .await;
    let any_id = permissions.str_at("/data/0/id").to_string();
    let path = format!("/api/v1/permissions/{any_id}");

    let update = app
        .request(
            "PUT",
            &path,
            Some(json!({ "description": "x" })),
            Some(&alice_token),
        )
        .await;
    assert_eq!(update.status, StatusCode::FORBIDDEN);

    let delete = app.request("DELETE", &path, None, Some(&alice_token)).await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);
}
