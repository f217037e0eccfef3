//! Service fixtures over the in-memory store.

use std::sync::Arc;

use warden_auth::{
    AuditLogEscalation, FailedLoginGuard, PasswordHasher, PasswordValidator, SessionManager,
    SessionStore,
};
use warden_core::config::AuthConfig;
use warden_database::seed::seed_defaults;
use warden_database::{MemoryStore, Stores};

use crate::context::ClientInfo;

pub(crate) struct Fixture {
    pub stores: Stores,
    pub config: AuthConfig,
    pub sessions: SessionManager,
    pub guard: FailedLoginGuard,
    pub hasher: PasswordHasher,
    pub validator: PasswordValidator,
}

pub(crate) async fn fixture() -> Fixture {
    let stores = Stores::memory(MemoryStore::new());
    seed_defaults(&stores).await.unwrap();

    let config = AuthConfig {
        jwt_secret: "service-test-secret".to_string(),
        ..AuthConfig::default()
    };
    let sessions = SessionManager::new(
        &config,
        SessionStore::new(stores.refresh_tokens.clone(), &config),
        stores.users.clone(),
    );
    let guard = FailedLoginGuard::new(
        stores.failed_logins.clone(),
        3,
        Arc::new(AuditLogEscalation::new(stores.request_logs.clone())),
    );

    Fixture {
        validator: PasswordValidator::new(&config),
        hasher: PasswordHasher::new(),
        stores,
        config,
        sessions,
        guard,
    }
}

pub(crate) fn client() -> ClientInfo {
    ClientInfo::new("192.0.2.10", Some("unit-test".to_string()))
}
