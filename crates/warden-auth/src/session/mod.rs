//! Refresh token lifecycle: issue, validate, rotate, revoke, purge.

pub mod cleanup;
pub mod manager;
pub mod store;

pub use cleanup::TokenCleanup;
pub use manager::{SessionManager, TokenPair};
pub use store::{IssuedRefreshToken, SessionStore};
