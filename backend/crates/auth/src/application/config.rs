//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::otp::{DEFAULT_TOKEN_BYTES, DEFAULT_TOKEN_TTL, OtpPolicy};
use platform::password::HashParams;
use secrecy::{ExposeSecret, Secret};

/// Shortest accepted JWT secret, in bytes
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Default bearer token lifetime (1 day)
pub const DEFAULT_JWT_TTL: Duration = Duration::from_secs(24 * 3600);

/// Attempts with a short suffix before falling back to a long one
pub const USER_NAME_ATTEMPTS: usize = 5;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: Secret<String>,
    /// Bearer token lifetime
    pub jwt_ttl: Duration,
    /// Email verification codes
    pub otp: OtpPolicy,
    /// Random bytes in a password reset token
    pub reset_token_bytes: usize,
    /// Password reset token lifetime
    pub reset_token_ttl: Duration,
    /// Argon2id cost
    pub hash_params: HashParams,
    /// Origin used in links sent by email, without trailing slash
    pub public_base_url: String,
}

impl AuthConfig {
    /// Defaults for everything but the secret
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: Secret::new(jwt_secret.into()),
            jwt_ttl: DEFAULT_JWT_TTL,
            otp: OtpPolicy::default(),
            reset_token_bytes: DEFAULT_TOKEN_BYTES,
            reset_token_ttl: DEFAULT_TOKEN_TTL,
            hash_params: HashParams::default(),
            public_base_url: "http://localhost:3000".to_string(),
        }
    }

    /// Cheap hashing, for tests
    pub fn for_tests() -> Self {
        Self {
            hash_params: HashParams::minimal(),
            ..Self::new("test-secret-test-secret-test-secret!")
        }
    }

    pub(crate) fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }

    /// Link the reset email points at
    pub fn reset_url(&self, token: &str) -> String {
        format!(
            "{}/api/v1/auth/reset-password/{token}",
            self.public_base_url.trim_end_matches('/')
        )
    }
}

/// Whole minutes of `ttl`, for email copy
pub(crate) fn minutes(ttl: Duration) -> u64 {
    ttl.as_secs() / 60
}
