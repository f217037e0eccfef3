//! # warden-auth
//!
//! Authentication and authorization core for Warden.
//!
//! ## Modules
//!
//! - `jwt`: HS256 access token signing and verification
//! - `password`: Argon2id password hashing, policy, and credential verification
//! - `session`: refresh token persistence, issuance, rotation, and revocation
//! - `rbac`: permission resolution over a loaded principal
//! - `guard`: failed login tracking with a pluggable escalation hook

pub mod guard;
pub mod jwt;
pub mod password;
pub mod rbac;
pub mod session;

pub use guard::{AuditLogEscalation, EscalationHook, FailedLoginGuard};
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{CredentialVerifier, PasswordHasher, PasswordValidator};
pub use rbac::Requirement;
pub use session::{SessionManager, SessionStore, TokenCleanup, TokenPair};
