//! Access token verification.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;

use super::claims::Claims;

/// Message returned for every rejected access token.
pub const INVALID_TOKEN: &str = "invalid token";

/// Verifies access token signature and expiry without touching storage.
///
/// Only HS256 is accepted; a token whose header names any other algorithm
/// is rejected before its signature is checked.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token.
    ///
    /// Every failure collapses into one authentication error; the reason is
    /// only logged at debug level.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let reason = match e.kind() {
                    JwtErrorKind::ExpiredSignature => "expired",
                    JwtErrorKind::InvalidSignature => "bad signature",
                    JwtErrorKind::InvalidAlgorithm => "algorithm mismatch",
                    JwtErrorKind::InvalidToken | JwtErrorKind::Base64(_) => "malformed",
                    _ => "invalid claims",
                };
                debug!(reason, "Access token rejected");
                AppError::authentication(INVALID_TOKEN)
            })
    }
}
