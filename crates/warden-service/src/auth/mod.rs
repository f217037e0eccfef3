//! Registration, login, token refresh, logout, and request authentication.

pub mod service;

pub use service::{AuthService, AuthSession, LoginInput, RegisterInput};
