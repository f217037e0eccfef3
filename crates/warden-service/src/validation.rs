//! Input checks shared by registration and admin user creation.

use warden_core::error::AppError;

/// Shortest accepted username, in characters.
pub const USERNAME_MIN_CHARS: usize = 3;
/// Longest accepted username, in characters.
pub const USERNAME_MAX_CHARS: usize = 50;

/// Rejects usernames outside the accepted length or containing whitespace.
pub fn validate_username(username: &str) -> Result<(), AppError> {
    let length = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&length) {
        return Err(AppError::validation(format!(
            "username must be between {USERNAME_MIN_CHARS} and {USERNAME_MAX_CHARS} characters"
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AppError::validation("username must not contain whitespace"));
    }
    Ok(())
}

/// Rejects strings that cannot be an email address.
///
/// Only the shape `local@domain.tld` is checked; deliverability is not.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let plausible = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if plausible {
        Ok(())
    } else {
        Err(AppError::validation("invalid email address"))
    }
}
