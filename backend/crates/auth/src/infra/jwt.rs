//! HS256 bearer tokens
//!
//! Claims carry the user id, standard `iat`/`exp` in seconds and the issue
//! time in milliseconds. The millisecond claim is what gets compared with
//! `password_changed_at`, so a password change invalidates every token
//! issued before it, even within the same second.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Issue time, Unix milliseconds
    pub iat_ms: i64,
}

impl Claims {
    pub fn user_id(&self) -> AuthResult<UserId> {
        Uuid::parse_str(&self.sub)
            .map(UserId::from_uuid)
            .map_err(|_| AuthError::InvalidToken)
    }
}

/// Issues and verifies tokens with one secret and lifetime.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &"HS256")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        let secret = config.jwt_secret_bytes();
        let ttl = TimeDelta::from_std(config.jwt_ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid token lifetime: {e}")))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    pub fn issue(&self, user_id: &UserId) -> AuthResult<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Token as if issued at `issued_at`
    pub fn issue_at(&self, user_id: &UserId, issued_at: DateTime<Utc>) -> AuthResult<String> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Internal("Token expiry overflow".to_string()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iat_ms: issued_at.timestamp_millis(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("Token signing failed: {e}")))
    }

    /// Expired tokens and everything else that fails are told apart.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }
}
