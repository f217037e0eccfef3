//! Username/password verification against stored hashes.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use warden_core::error::AppError;
use warden_database::store::UserStore;
use warden_entity::user::User;

use super::hasher::PasswordHasher;

/// Message returned for every failed credential check.
pub const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Password hashed once and verified against for unknown identifiers.
const DECOY_PASSWORD: &str = "warden-decoy-credential";

/// Checks a login identifier and password pair.
///
/// Unknown user, wrong password, and disabled account all produce the same
/// authentication error so callers cannot tell them apart. An unknown
/// identifier still costs one Argon2 verification.
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    decoy_hash: Arc<OnceCell<String>>,
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier").finish_non_exhaustive()
    }
}

impl CredentialVerifier {
    /// Creates a verifier over the given user store.
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self {
            users,
            hasher,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Returns the user if `identifier` (username or email) and `password` match
    /// an active account.
    pub async fn verify(&self, identifier: &str, password: &str) -> Result<User, AppError> {
        let Some(user) = self.users.find_by_login(identifier).await? else {
            self.burn_verification(password).await?;
            debug!("Login rejected: unknown identifier");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify_password_blocking(password.to_string(), user.password_hash.clone())
            .await?;
        if !matches {
            debug!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        if !user.is_active {
            debug!(user_id = %user.id, "Login rejected: account disabled");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        Ok(user)
    }

    async fn burn_verification(&self, password: &str) -> Result<(), AppError> {
        let hash = self
            .decoy_hash
            .get_or_try_init(|| {
                self.hasher
                    .hash_password_blocking(DECOY_PASSWORD.to_string())
            })
            .await?;
        self.hasher
            .verify_password_blocking(password.to_string(), hash.clone())
            .await?;
        Ok(())
    }
}
