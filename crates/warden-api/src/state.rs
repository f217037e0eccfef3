//! Application state shared across all handlers and middleware.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use warden_auth::{
    AuditLogEscalation, EscalationHook, FailedLoginGuard, PasswordHasher, PasswordValidator,
    SessionManager, SessionStore, TokenCleanup,
};
use warden_core::config::AppConfig;
use warden_database::Stores;
use warden_service::{
    AuthService, PermissionService, RoleService, SecurityService, UserAdminService,
};

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Every field is
/// cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Store handles (PostgreSQL or in-memory)
    pub stores: Stores,

    // ── Auth ─────────────────────────────────────────────────
    /// Token issuance, validation, and revocation
    pub session_manager: SessionManager,
    /// Per-client request limiter
    pub rate_limiter: RateLimiter,
    /// Peers whose forwarding headers name the real client
    pub trusted_proxies: Arc<[IpAddr]>,

    // ── Services ─────────────────────────────────────────────
    /// Registration, login, refresh, logout, authentication
    pub auth_service: Arc<AuthService>,
    /// Admin user management
    pub user_service: Arc<UserAdminService>,
    /// Role management
    pub role_service: Arc<RoleService>,
    /// Permission catalogue
    pub permission_service: Arc<PermissionService>,
    /// Security telemetry
    pub security_service: Arc<SecurityService>,
}

impl AppState {
    /// Wires every component from configuration and stores, with the default
    /// escalation hook and a rate limiter built from configuration.
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let hook: Arc<dyn EscalationHook> =
            Arc::new(AuditLogEscalation::new(stores.request_logs.clone()));
        let limiter = RateLimiter::from_config(&config.security);
        Self::with_components(config, stores, hook, limiter)
    }

    /// Wires every component with an explicit escalation hook and rate limiter.
    pub fn with_components(
        config: AppConfig,
        stores: Stores,
        escalation: Arc<dyn EscalationHook>,
        rate_limiter: RateLimiter,
    ) -> Self {
        let hasher = PasswordHasher::new();
        let validator = PasswordValidator::new(&config.auth);

        let session_store = SessionStore::new(stores.refresh_tokens.clone(), &config.auth);
        let session_manager =
            SessionManager::new(&config.auth, session_store, stores.users.clone());

        let guard = FailedLoginGuard::new(
            stores.failed_logins.clone(),
            config.security.failed_login_threshold,
            escalation,
        );

        let auth_service = Arc::new(AuthService::new(
            stores.users.clone(),
            stores.roles.clone(),
            hasher.clone(),
            validator.clone(),
            session_manager.clone(),
            guard,
        ));
        let user_service = Arc::new(UserAdminService::new(
            stores.users.clone(),
            stores.roles.clone(),
            hasher,
            validator,
            session_manager.clone(),
        ));
        let role_service = Arc::new(RoleService::new(
            stores.roles.clone(),
            stores.permissions.clone(),
        ));
        let permission_service = Arc::new(PermissionService::new(stores.permissions.clone()));
        let security_service = Arc::new(SecurityService::new(
            stores.failed_logins.clone(),
            stores.request_logs.clone(),
        ));

        let trusted_proxies: Arc<[IpAddr]> = config.security.trusted_proxy_addrs().into();

        Self {
            config: Arc::new(config),
            stores,
            session_manager,
            rate_limiter,
            trusted_proxies,
            auth_service,
            user_service,
            role_service,
            permission_service,
            security_service,
        }
    }

    /// Background purge of expired and revoked refresh tokens.
    pub fn token_cleanup(&self) -> TokenCleanup {
        TokenCleanup::new(
            self.session_manager.store().clone(),
            Duration::from_secs(self.config.auth.token_cleanup_interval_seconds),
        )
    }
}
