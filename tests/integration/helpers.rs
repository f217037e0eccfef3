//! Shared helpers for integration tests.
//!
//! Every `TestApp` owns a fresh in-memory store seeded with the default
//! roles and permissions, so tests need no database.

#![allow(dead_code)]

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use warden_api::middleware::rate_limit::RateLimiter;
use warden_api::{AppState, build_app};
use warden_auth::guard::{AuditLogEscalation, EscalationHook};
use warden_core::config::AppConfig;
use warden_database::MemoryStore;
use warden_database::seed::seed_defaults;
use warden_database::store::Stores;

/// Default password used by helper-created users.
pub const PASSWORD: &str = "password123";

/// Test application context
pub struct TestApp {
    /// The router under test
    pub router: Router,
    /// Shared application state
    pub state: AppState,
}

/// Configuration used by tests unless overridden.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.security.rate_limit_requests = 10_000;
    config
}

impl TestApp {
    /// App with the test configuration.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// App with a custom configuration and the default escalation hook.
    pub async fn with_config(config: AppConfig) -> Self {
        let stores = Stores::memory(MemoryStore::new());
        let hook: Arc<dyn EscalationHook> =
            Arc::new(AuditLogEscalation::new(stores.request_logs.clone()));
        Self::build(config, stores, hook).await
    }

    /// App with a custom configuration and escalation hook.
    pub async fn with_hook(config: AppConfig, hook: Arc<dyn EscalationHook>) -> Self {
        Self::build(config, Stores::memory(MemoryStore::new()), hook).await
    }

    async fn build(config: AppConfig, stores: Stores, hook: Arc<dyn EscalationHook>) -> Self {
        seed_defaults(&stores).await.expect("seeding failed");
        let limiter = RateLimiter::new(
            config.security.rate_limit_requests,
            Duration::from_secs(config.security.rate_limit_window_seconds),
        );
        let state = AppState::with_components(config, stores, hook, limiter);
        let router = build_app(state.clone());
        Self { router, state }
    }

    /// Registers a user and returns the response body's `data`.
    pub async fn register(&self, username: &str) -> Value {
        let response = self
            .request(
                "POST",
                "/api/v1/auth/register",
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": PASSWORD,
                })),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "register failed: {:?}",
            response.body
        );
        response.body["data"].clone()
    }

    /// Logs in and returns `(access_token, refresh_token)`.
    pub async fn login(&self, username: &str, password: &str) -> (String, String) {
        let response = self
            .request(
                "POST",
                "/api/v1/auth/login",
                Some(json!({ "username": username, "password": password })),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "login failed: {:?}",
            response.body
        );
        (
            response.str_at("/data/access_token").to_string(),
            response.str_at("/data/refresh_token").to_string(),
        )
    }

    /// Registers a user, grants the `admin` role directly in the store, and
    /// returns `(user_id, access_token)`.
    pub async fn admin(&self, username: &str) -> (Uuid, String) {
        let data = self.register(username).await;
        let id: Uuid = data["user"]["id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("user id");
        let admin = self
            .state
            .stores
            .roles
            .find_by_name("admin")
            .await
            .expect("role lookup")
            .expect("admin role seeded");
        self.state
            .stores
            .users
            .assign_role(id, admin.id, None)
            .await
            .expect("assign admin");
        let (access, _) = self.login(username, PASSWORD).await;
        (id, access)
    }

    /// Makes a JSON request.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        self.request_from(method, path, body, token, "198.51.100.1").await
    }

    /// Makes a JSON request that appears to come from `client_ip`.
    pub async fn request_from(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        client_ip: &str,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.send_raw(method, path, body_str, token, client_ip).await
    }

    /// Sends a raw body with an explicit `Content-Length` from socket peer `client_ip`.
    pub async fn send_raw(
        &self,
        method: &str,
        path: &str,
        body: String,
        token: Option<&str>,
        client_ip: &str,
    ) -> TestResponse {
        self.send(method, path, body, token, client_ip, &[]).await
    }

    /// Sends a request from socket peer `peer` with extra headers.
    pub async fn send(
        &self,
        method: &str,
        path: &str,
        body: String,
        token: Option<&str>,
        peer: &str,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("Content-Length", body.len());

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let mut req = req.body(Body::from(body)).expect("Failed to build request");
        let peer: IpAddr = peer.parse().expect("peer must be an IP address");
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::new(peer, 40_000)));

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` when not JSON
    pub body: Value,
}

impl TestResponse {
    /// String at a JSON pointer, panicking when absent.
    pub fn str_at(&self, pointer: &str) -> &str {
        self.body
            .pointer(pointer)
            .and_then(Value::as_str)
            .unwrap_or_else(|| panic!("missing {pointer} in {:?}", self.body))
    }

    /// The `error` code of an error body.
    pub fn error_code(&self) -> &str {
        self.str_at("/error")
    }
}
