//! Integration tests for the security guard: rate limiting, size limits,
//! response headers, client address trust, and failed-login escalation.

mod helpers;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestApp, test_config};
use warden_auth::guard::EscalationHook;
use warden_core::result::AppResult;
use warden_entity::security::FailedLoginRecord;

/// Records escalations instead of writing audit entries.
#[derive(Default)]
struct RecordingHook {
    escalations: Mutex<Vec<(String, i32)>>,
}

impl RecordingHook {
    fn calls(&self) -> Vec<(String, i32)> {
        self.escalations.lock().expect("lock").clone()
    }
}

#[async_trait]
impl EscalationHook for RecordingHook {
    async fn escalate(&self, record: &FailedLoginRecord) -> AppResult<()> {
        self.escalations
            .lock()
            .expect("lock")
            .push((record.ip_address.clone(), record.attempts));
        Ok(())
    }
}

async fn failed_login(app: &TestApp, ip: &str) -> StatusCode {
    app.request_from(
        "POST",
        "/api/v1/auth/login",
        Some(json!({ "username": "alice", "password": "wrongpassword" })),
        None,
        ip,
    )
    .await
    .status
}

#[tokio::test]
async fn test_rate_limit_rejects_request_over_ceiling() {
    let mut config = test_config();
    config.security.rate_limit_requests = 3;
    let app = TestApp::with_config(config).await;

    for _ in 0..3 {
        let ok = app
            .request_from("GET", "/health", None, None, "203.0.113.5")
            .await;
        assert_eq!(ok.status, StatusCode::OK);
    }

    let limited = app
        .request_from("GET", "/health", None, None, "203.0.113.5")
        .await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.error_code(), "RATE_LIMIT");

    // Other clients have their own window.
    let other = app
        .request_from("GET", "/health", None, None, "203.0.113.6")
        .await;
    assert_eq!(other.status, StatusCode::OK);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = test_config();
    config.security.max_request_bytes = 1024;
    let app = TestApp::with_config(config).await;

    let body = json!({
        "username": "alice",
        "email": "alice@example.com",
        "password": "x".repeat(2048),
    })
    .to_string();
    let response = app
        .send_raw("POST", "/api/v1/auth/register", body, None, "203.0.113.5")
        .await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.error_code(), "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = TestApp::new().await;

    let ok = app.request("GET", "/health", None, None).await;
    let denied = app.request("GET", "/api/v1/auth/me", None, None).await;
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);

    for response in [&ok, &denied] {
        let headers = &response.headers;
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
        assert!(headers.contains_key("strict-transport-security"));
        assert_eq!(headers["content-security-policy"], "default-src 'self'");
        assert!(headers.contains_key("referrer-policy"));
    }
}

#[tokio::test]
async fn test_cors_preflight_carries_security_headers() {
    let app = TestApp::new().await;

    let preflight = app
        .send(
            "OPTIONS",
            "/api/v1/auth/login",
            String::new(),
            None,
            "198.51.100.1",
            &[
                ("Origin", "https://app.example.com"),
                ("Access-Control-Request-Method", "POST"),
            ],
        )
        .await;
    assert!(preflight.status.is_success());
    assert!(preflight.headers.contains_key("access-control-allow-origin"));
    assert_eq!(preflight.headers["x-frame-options"], "DENY");
    assert_eq!(preflight.headers["content-security-policy"], "default-src 'self'");
}

#[tokio::test]
async fn test_ip_allowlist() {
    let mut config = test_config();
    config.security.allowed_ips = vec!["10.0.0.1".to_string()];
    let app = TestApp::with_config(config).await;

    let allowed = app
        .request_from("GET", "/health", None, None, "10.0.0.1")
        .await;
    assert_eq!(allowed.status, StatusCode::OK);

    let denied = app
        .request_from("GET", "/health", None, None, "10.0.0.2")
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_forwarded_for_from_untrusted_peer_cannot_pass_allowlist() {
    let mut config = test_config();
    config.security.allowed_ips = vec!["10.0.0.1".to_string()];
    let app = TestApp::with_config(config).await;

    let spoofed = app
        .send(
            "GET",
            "/health",
            String::new(),
            None,
            "192.0.2.50",
            &[("X-Forwarded-For", "10.0.0.1"), ("X-Real-IP", "10.0.0.1")],
        )
        .await;
    assert_eq!(spoofed.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_reset_rate_limit() {
    let mut config = test_config();
    config.security.rate_limit_requests = 2;
    let app = TestApp::with_config(config).await;

    let mut statuses = Vec::new();
    for claimed in ["203.0.113.1", "203.0.113.2", "203.0.113.3"] {
        let response = app
            .send(
                "GET",
                "/health",
                String::new(),
                None,
                "192.0.2.50",
                &[("X-Forwarded-For", claimed)],
            )
            .await;
        statuses.push(response.status);
    }
    assert_eq!(
        statuses,
        vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
    );
}

#[tokio::test]
async fn test_trusted_proxy_forwards_client_address() {
    let mut config = test_config();
    config.security.trusted_proxies = vec!["10.0.0.254".to_string()];
    config.security.allowed_ips = vec!["203.0.113.7".to_string()];
    let app = TestApp::with_config(config).await;

    for (client, expected) in [
        ("203.0.113.7", StatusCode::OK),
        ("203.0.113.8", StatusCode::FORBIDDEN),
    ] {
        let response = app
            .send(
                "GET",
                "/health",
                String::new(),
                None,
                "10.0.0.254",
                &[("X-Forwarded-For", client)],
            )
            .await;
        assert_eq!(response.status, expected, "client {client}");
    }
}

#[tokio::test]
async fn test_failed_logins_escalate_at_threshold() {
    let mut config = test_config();
    config.security.failed_login_threshold = 3;
    let hook = Arc::new(RecordingHook::default());
    let app = TestApp::with_hook(config, hook.clone()).await;
    app.register("alice").await;

    for _ in 0..2 {
        assert_eq!(failed_login(&app, "203.0.113.9").await, StatusCode::UNAUTHORIZED);
    }
    assert!(hook.calls().is_empty());

    assert_eq!(failed_login(&app, "203.0.113.9").await, StatusCode::UNAUTHORIZED);
    assert_eq!(hook.calls(), vec![("203.0.113.9".to_string(), 3)]);

    // A different address starts its own count.
    assert_eq!(failed_login(&app, "203.0.113.10").await, StatusCode::UNAUTHORIZED);
    assert_eq!(hook.calls().len(), 1);
}

#[tokio::test]
async fn test_failed_logins_visible_to_admin() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin("root").await;

    for _ in 0..2 {
        failed_login(&app, "203.0.113.9").await;
    }

    let response = app
        .request(
            "GET",
            "/api/v1/security/failed-logins",
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let items = response.body["data"]["items"].as_array().expect("items");
    let record = items
        .iter()
        .find(|r| r["ip_address"] == "203.0.113.9")
        .expect("record for client");
    assert_eq!(record["attempts"], 2);
    assert_eq!(record["username"], "alice");
}
