//! # warden-api
//!
//! HTTP API layer for Warden built on Axum.
//!
//! Provides the REST endpoints, the authorization pipeline (token
//! extraction, principal loading, per-route requirements), rate limiting,
//! the security guard, request audit logging, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
