//! Axum middleware stack.
//!
//! Outermost first: security headers, request logging, IP allow-list,
//! request size guard, rate limiting. Protected routes then run
//! authentication followed by their per-route requirement.

pub mod auth;
pub mod cors;
pub mod logging;
pub mod rate_limit;
pub mod rbac;
pub mod security;
