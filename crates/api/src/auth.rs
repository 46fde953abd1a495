//! Bearer token verification.
//!
//! Sessions are issued by the external identity provider. We only check the
//! signature, expiry and audience, then trust `sub` as the user id.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use plaza_common::{AppError, AppResult, config::AuthConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Claims we read from an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Opaque user id.
    pub sub: String,
    pub exp: i64,
    pub aud: String,
}

/// HS256 verifier for access tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier for tokens signed with `secret` for `audience`.
    #[must_use]
    pub fn new(secret: &[u8], audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.jwt_secret.as_bytes(), &config.jwt_audience)
    }

    /// Verify a token and return its subject.
    pub fn verify(&self, token: &str) -> AppResult<String> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(error = %e, "Rejected access token");
            AppError::Unauthorized
        })?;

        if data.claims.sub.is_empty() {
            return Err(AppError::Unauthorized);
        }

        Ok(data.claims.sub)
    }
}
