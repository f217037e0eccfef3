//! Route definitions for the Warden HTTP API.
//!
//! Public auth routes and protected routes are mounted under `/api/v1`;
//! `/health` sits at the root. Protected routes run `require_auth` first and
//! then their own requirement.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use warden_auth::rbac::Requirement;

use crate::handlers;
use crate::middleware::{self, cors::build_cors_layer, rbac::guarded};
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = usize::try_from(state.config.security.max_request_bytes).unwrap_or(usize::MAX);

    let protected = Router::new()
        .merge(session_routes())
        .merge(user_routes())
        .merge(role_routes())
        .merge(permission_routes())
        .merge(security_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let api_routes = Router::new().merge(public_auth_routes()).merge(protected);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(handlers::health::health))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::security::request_size_limit,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::security::ip_allowlist,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::logging::request_logging,
        ))
        .layer(build_cors_layer(&state.config.server.cors))
        .layer(TraceLayer::new_for_http())
        // Outermost: CORS preflight responses carry these headers as well.
        .layer(axum_middleware::from_fn(
            middleware::security::security_headers,
        ))
        .with_state(state)
}

/// Register, login, refresh: no token required
fn public_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
}

/// Current principal and logout
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/logout-all", post(handlers::auth::logout_all))
}

/// Admin user management
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            guarded(
                get(handlers::users::list_users),
                Requirement::permission("users", "read"),
            )
            .merge(guarded(
                post(handlers::users::create_user),
                Requirement::permission("users", "write"),
            )),
        )
        .route(
            "/users/{id}",
            guarded(
                get(handlers::users::get_user),
                Requirement::permission("users", "read"),
            )
            .merge(guarded(
                put(handlers::users::update_user),
                Requirement::permission("users", "write"),
            ))
            .merge(guarded(
                delete(handlers::users::delete_user),
                Requirement::permission("users", "delete"),
            )),
        )
        .route(
            "/users/{id}/roles",
            guarded(
                post(handlers::users::assign_roles),
                Requirement::role("admin"),
            ),
        )
}

/// Role management
fn role_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/roles",
            guarded(
                get(handlers::roles::list_roles),
                Requirement::permission("roles", "read"),
            )
            .merge(guarded(
                post(handlers::roles::create_role),
                Requirement::permission("roles", "write"),
            )),
        )
        .route(
            "/roles/{id}",
            guarded(
                get(handlers::roles::get_role),
                Requirement::permission("roles", "read"),
            )
            .merge(guarded(
                put(handlers::roles::update_role),
                Requirement::permission("roles", "write"),
            ))
            .merge(guarded(
                delete(handlers::roles::delete_role),
                Requirement::permission("roles", "delete"),
            )),
        )
}

/// Permission catalogue
fn permission_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/permissions",
            guarded(
                get(handlers::permissions::list_permissions),
                Requirement::permission("permissions", "read"),
            )
            .merge(guarded(
                post(handlers::permissions::create_permission),
                Requirement::permission("permissions", "write"),
            )),
        )
        .route(
            "/permissions/{id}",
            guarded(
                get(handlers::permissions::get_permission),
                Requirement::permission("permissions", "read"),
            )
            .merge(guarded(
                put(handlers::permissions::update_permission),
                Requirement::permission("permissions", "write"),
            ))
            .merge(guarded(
                delete(handlers::permissions::delete_permission),
                Requirement::permission("permissions", "delete"),
            )),
        )
}

/// Security telemetry (admin only)
fn security_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/security/failed-logins",
            guarded(
                get(handlers::security::failed_logins),
                Requirement::role("admin"),
            ),
        )
        .route(
            "/security/request-logs",
            guarded(
                get(handlers::security::request_logs),
                Requirement::role("admin"),
            ),
        )
}
