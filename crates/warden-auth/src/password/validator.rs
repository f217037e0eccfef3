//! Password policy for new passwords.

use warden_core::config::AuthConfig;
use warden_core::error::AppError;

/// Upper bound on password length, in bytes, to cap hashing cost.
const MAX_PASSWORD_BYTES: usize = 128;

/// Validates new passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Returns the first policy violation, if any.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "password must be at least {} characters long",
                self.min_length
            )));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::validation(format!(
                "password must be at most {MAX_PASSWORD_BYTES} bytes long"
            )));
        }
        Ok(())
    }
}
