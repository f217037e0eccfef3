//! `AuthUser` extractor: the [`RequestContext`] placed by the auth middleware.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use warden_core::error::AppError;
use warden_service::context::RequestContext;

use crate::error::ApiError;
use crate::middleware::auth::NO_TOKEN_PROVIDED;

/// Authenticated request context available in handlers.
///
/// Only routes behind `require_auth` can produce it; elsewhere extraction
/// fails with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::authentication(NO_TOKEN_PROVIDED).into())
    }
}
