//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Argon2 password hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Disabled accounts fail every authorization check.
    pub is_active: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
}

/// Partial update of a user's profile and status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New email address.
    pub email: Option<String>,
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
}

impl UpdateUser {
    /// Apply the present fields to `user`, bumping `updated_at`.
    pub fn apply_to(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(first_name) = &self.first_name {
            user.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = Some(last_name.clone());
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
        user.updated_at = now;
    }
}

/// Narrowing applied when listing users.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFilter {
    /// Only users with this active flag.
    pub active: Option<bool>,
    /// Case-insensitive substring of the username or email.
    pub search: Option<String>,
}

impl UserFilter {
    /// The trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Whether `user` passes the filter.
    pub fn matches(&self, user: &User) -> bool {
        if self.active.is_some_and(|active| user.is_active != active) {
            return false;
        }
        match self.search_term() {
            Some(term) => {
                let term = term.to_lowercase();
                user.username.to_lowercase().contains(&term)
                    || user.email.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}
