//! PostgreSQL implementations of the store traits.

pub mod failed_login;
pub mod permission;
pub mod refresh_token;
pub mod request_log;
pub mod role;
pub mod user;

pub use failed_login::FailedLoginRepository;
pub use permission::PermissionRepository;
pub use refresh_token::RefreshTokenRepository;
pub use request_log::RequestLogRepository;
pub use role::RoleRepository;
pub use user::UserRepository;

use warden_core::error::AppError;

/// Map a sqlx error, turning unique-constraint violations into conflicts.
pub(crate) fn map_write_err(context: &str, conflict: &str, err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::conflict(conflict);
        }
    }
    AppError::storage(context, err)
}
