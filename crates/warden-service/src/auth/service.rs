//! Authentication service.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use warden_auth::jwt::decoder::INVALID_TOKEN;
use warden_auth::{
    CredentialVerifier, FailedLoginGuard, PasswordHasher, PasswordValidator, SessionManager,
    TokenPair,
};
use warden_core::error::{AppError, ErrorKind};
use warden_database::store::{RoleStore, UserStore};
use warden_entity::security::FailedLoginAttempt;
use warden_entity::user::{CreateUser, Principal, User};

use crate::context::{ClientInfo, RequestContext};
use crate::validation::{validate_email, validate_username};

/// Role given to every self-registered account.
pub const DEFAULT_SIGNUP_ROLE: &str = "user";

/// Message when the token's user no longer exists.
pub const USER_NOT_FOUND: &str = "user not found";
/// Message when the token's user has been disabled.
pub const ACCOUNT_DISABLED: &str = "account disabled";

/// Self-registration input.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    /// Unique login name.
    pub username: String,
    /// Unique email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
}

/// Login input.
#[derive(Debug, Clone)]
pub struct LoginInput {
    /// Username or email.
    pub identifier: String,
    /// Plaintext password.
    pub password: String,
}

/// A user together with freshly issued tokens.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    /// The authenticated user.
    pub user: User,
    /// Access and refresh tokens.
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Handles the account-facing authentication flows.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    verifier: CredentialVerifier,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    sessions: SessionManager,
    guard: FailedLoginGuard,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("sessions", &self.sessions)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        hasher: PasswordHasher,
        validator: PasswordValidator,
        sessions: SessionManager,
        guard: FailedLoginGuard,
    ) -> Self {
        Self {
            verifier: CredentialVerifier::new(Arc::clone(&users), hasher.clone()),
            users,
            roles,
            hasher,
            validator,
            sessions,
            guard,
        }
    }

    /// Token issuance and validation.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Creates an account with the default role and signs it in.
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AppError> {
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_string();

        validate_username(&username)?;
        validate_email(&email)?;
        self.validator.validate(&input.password)?;

        if self
            .users
            .exists_by_username_or_email(&username, &email)
            .await?
        {
            return Err(AppError::conflict("username or email already exists"));
        }

        let password_hash = self.hasher.hash_password_blocking(input.password).await?;
        let user = self
            .users
            .create(CreateUser {
                username,
                email,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
            })
            .await?;

        match self.roles.find_by_name(DEFAULT_SIGNUP_ROLE).await? {
            Some(role) => self.users.assign_role(user.id, role.id, None).await?,
            None => warn!(role = DEFAULT_SIGNUP_ROLE, "Default signup role missing"),
        }

        let tokens = self.sessions.issue_token_pair(&user).await?;
        info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(AuthSession { user, tokens })
    }

    /// Verifies credentials and issues a token pair.
    ///
    /// Every rejected attempt is recorded against the client address.
    pub async fn login(
        &self,
        input: LoginInput,
        client: &ClientInfo,
    ) -> Result<AuthSession, AppError> {
        let user = match self.verifier.verify(&input.identifier, &input.password).await {
            Ok(user) => user,
            Err(e) => {
                if e.kind == ErrorKind::Authentication {
                    self.record_failure(&input.identifier, client).await;
                }
                return Err(e);
            }
        };

        let tokens = self.sessions.issue_token_pair(&user).await?;
        info!(user_id = %user.id, ip = %client.ip_address, "User logged in");

        Ok(AuthSession { user, tokens })
    }

    async fn record_failure(&self, identifier: &str, client: &ClientInfo) {
        let attempt = FailedLoginAttempt {
            ip_address: client.ip_address.clone(),
            username: identifier.to_string(),
            user_agent: client.user_agent.clone(),
        };
        if let Err(e) = self.guard.record(&attempt).await {
            warn!(error = %e, ip = %client.ip_address, "Failed to record failed login");
        }
    }

    /// Exchanges a refresh token for a new pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        self.sessions.refresh(refresh_token).await
    }

    /// Revokes one of the caller's refresh tokens.
    ///
    /// Tokens that are unknown, already revoked, or owned by someone else
    /// are left untouched without an error.
    pub async fn logout(&self, ctx: &RequestContext, refresh_token: &str) -> Result<(), AppError> {
        let owned = self
            .sessions
            .store()
            .find_valid(refresh_token)
            .await?
            .is_some_and(|record| record.user_id == ctx.user_id());

        if owned {
            self.sessions.revoke(refresh_token).await?;
            info!(user_id = %ctx.user_id(), "User logged out");
        }
        Ok(())
    }

    /// Revokes all of the caller's refresh tokens.
    pub async fn logout_all(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        let revoked = self.sessions.revoke_all(ctx.user_id()).await?;
        info!(user_id = %ctx.user_id(), revoked, "User logged out everywhere");
        Ok(revoked)
    }

    /// The caller's principal.
    pub fn me(&self, ctx: &RequestContext) -> Principal {
        ctx.principal.as_ref().clone()
    }

    /// Resolves an access token to an active principal.
    ///
    /// The principal is reloaded on every call so that role changes and
    /// account disabling take effect before the token expires.
    pub async fn authenticate(&self, access_token: &str) -> Result<Principal, AppError> {
        let claims = self
            .sessions
            .verify_access_token(access_token)
            .map_err(|_| AppError::authentication(INVALID_TOKEN))?;

        let principal = self
            .users
            .load_principal(claims.user_id)
            .await?
            .ok_or_else(|| AppError::authentication(USER_NOT_FOUND))?;

        if !principal.is_active() {
            return Err(AppError::authentication(ACCOUNT_DISABLED));
        }
        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, client, fixture};
    use warden_database::store::FailedLoginStore;
    use warden_entity::user::UpdateUser;

    fn service(f: &Fixture) -> AuthService {
        AuthService::new(
            f.stores.users.clone(),
            f.stores.roles.clone(),
            f.hasher.clone(),
            f.validator.clone(),
            f.sessions.clone(),
            f.guard.clone(),
        )
    }

    fn alice() -> RegisterInput {
        RegisterInput {
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password: "secret1".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
        }
    }

    fn login(identifier: &str, password: &str) -> LoginInput {
        LoginInput {
            identifier: identifier.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_assigns_user_role_and_issues_tokens() {
        let f = fixture().await;
        let auth = service(&f);
        let session = auth.register(alice()).await.unwrap();

        let principal = auth.authenticate(&session.tokens.access_token).await.unwrap();
        assert_eq!(principal.id(), session.user.id);
        assert_eq!(principal.role_names().collect::<Vec<_>>(), vec!["user"]);
        assert!(!session.tokens.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let f = fixture().await;
        let auth = service(&f);
        auth.register(alice()).await.unwrap();

        let dup = auth.register(alice()).await.unwrap_err();
        assert_eq!(dup.kind, ErrorKind::Conflict);

        let short = auth
            .register(RegisterInput {
                username: "bob".to_string(),
                email: "bob@x.com".to_string(),
                password: "12345".to_string(),
                first_name: None,
                last_name: None,
            })
            .await
            .unwrap_err();
        assert_eq!(short.kind, ErrorKind::Validation);

        let email = auth
            .register(RegisterInput {
                email: "not-an-email".to_string(),
                username: "carol".to_string(),
                ..alice()
            })
            .await
            .unwrap_err();
        assert_eq!(email.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_login_failure_is_generic_and_recorded() {
        let f = fixture().await;
        let auth = service(&f);
        auth.register(alice()).await.unwrap();

        let wrong = auth.login(login("alice", "wrong"), &client()).await.unwrap_err();
        let unknown = auth.login(login("nobody", "secret1"), &client()).await.unwrap_err();
        assert_eq!(wrong.message, unknown.message);
        assert_eq!(wrong.kind, ErrorKind::Authentication);

        let page = f
            .stores
            .failed_logins
            .list(warden_core::types::PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].attempts, 2);
        assert_eq!(page.items[0].username, "nobody");
    }

    #[tokio::test]
    async fn test_login_by_email() {
        let f = fixture().await;
        let auth = service(&f);
        let registered = auth.register(alice()).await.unwrap();
        let session = auth.login(login("alice@x.com", "secret1"), &client()).await.unwrap();
        assert_eq!(session.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_authenticate_sees_disabled_account() {
        let f = fixture().await;
        let auth = service(&f);
        let session = auth.register(alice()).await.unwrap();

        f.stores
            .users
            .update(
                session.user.id,
                &UpdateUser {
                    is_active: Some(false),
                    ..UpdateUser::default()
                },
            )
            .await
            .unwrap();

        let err = auth.authenticate(&session.tokens.access_token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, ACCOUNT_DISABLED);

        f.stores.users.delete(session.user.id).await.unwrap();
        let err = auth.authenticate(&session.tokens.access_token).await.unwrap_err();
        assert_eq!(err.message, USER_NOT_FOUND);

        let err = auth.authenticate("garbage").await.unwrap_err();
        assert_eq!(err.message, INVALID_TOKEN);
    }

    #[tokio::test]
    async fn test_logout_ignores_foreign_tokens() {
        let f = fixture().await;
        let auth = service(&f);
        let first = auth.register(alice()).await.unwrap();
        let second = auth
            .register(RegisterInput {
                username: "bob".to_string(),
                email: "bob@x.com".to_string(),
                ..alice()
            })
            .await
            .unwrap();

        let ctx = RequestContext::new(
            auth.authenticate(&first.tokens.access_token).await.unwrap(),
            client(),
        );

        auth.logout(&ctx, &second.tokens.refresh_token).await.unwrap();
        assert!(auth.refresh(&second.tokens.refresh_token).await.is_ok());

        auth.logout(&ctx, &first.tokens.refresh_token).await.unwrap();
        auth.logout(&ctx, &first.tokens.refresh_token).await.unwrap();
        assert!(auth.refresh(&first.tokens.refresh_token).await.is_err());
    }
}
