//! One-time codes and opaque tokens
//!
//! Only the SHA-256 hash and the expiry are meant to be persisted. The plain
//! value is handed out once (by email) and verified later by hashing the
//! submitted value and comparing hashes.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use zeroize::Zeroizing;

use crate::crypto::{random_bytes, random_digits, sha256_hex};

pub const DEFAULT_OTP_LENGTH: usize = 6;
pub const DEFAULT_OTP_TTL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_TOKEN_BYTES: usize = 32;
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(10 * 60);

/// Freshly generated secret. `Debug` never prints the plain value.
pub struct OneTimeSecret {
    plain: Zeroizing<String>,
    hashed: String,
    expires_at: DateTime<Utc>,
}

impl OneTimeSecret {
    fn new(plain: String, ttl: Duration) -> Self {
        let hashed = hash_secret(&plain);
        Self {
            plain: Zeroizing::new(plain),
            hashed,
            expires_at: expiry_after(ttl),
        }
    }

    /// The value to deliver to the user
    pub fn plain(&self) -> &str {
        &self.plain
    }

    /// The value to store
    pub fn hashed(&self) -> &str {
        &self.hashed
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl fmt::Debug for OneTimeSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneTimeSecret")
            .field("plain", &"[REDACTED]")
            .field("hashed", &self.hashed)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Numeric code of `length` digits valid for `ttl`.
pub fn generate_secure_otp(length: usize, ttl: Duration) -> OneTimeSecret {
    OneTimeSecret::new(random_digits(length), ttl)
}

/// Hex token of `bytes` random bytes valid for `ttl`.
pub fn generate_secure_token(bytes: usize, ttl: Duration) -> OneTimeSecret {
    OneTimeSecret::new(hex::encode(random_bytes(bytes)), ttl)
}

/// Stored form of a submitted code or token.
pub fn hash_secret(plain: &str) -> String {
    sha256_hex(plain.as_bytes())
}

fn expiry_after(ttl: Duration) -> DateTime<Utc> {
    let now = Utc::now();
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Length and lifetime of generated codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpPolicy {
    pub length: usize,
    pub ttl: Duration,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            length: DEFAULT_OTP_LENGTH,
            ttl: DEFAULT_OTP_TTL,
        }
    }
}

impl OtpPolicy {
    pub fn generate(&self) -> OneTimeSecret {
        generate_secure_otp(self.length, self.ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_shape_and_hash() {
        let otp = generate_secure_otp(6, DEFAULT_OTP_TTL);
        assert_eq!(otp.plain().len(), 6);
        assert!(otp.plain().chars().all(|c| c.is_ascii_digit()));
        assert_eq!(otp.hashed(), hash_secret(otp.plain()));
        assert_eq!(otp.hashed().len(), 64);
    }

    #[test]
    fn test_otp_expiry_window() {
        let before = Utc::now();
        let otp = generate_secure_otp(6, DEFAULT_OTP_TTL);
        let delta = otp.expires_at() - before;
        assert!(delta <= TimeDelta::minutes(15) + TimeDelta::seconds(1));
        assert!(delta >= TimeDelta::minutes(15) - TimeDelta::seconds(1));
    }

    #[test]
    fn test_token_is_hex() {
        let token = generate_secure_token(DEFAULT_TOKEN_BYTES, DEFAULT_TOKEN_TTL);
        assert_eq!(token.plain().len(), 64);
        assert!(token.plain().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token.plain(), token.hashed());
    }

    #[test]
    fn test_debug_redacts_plain_value() {
        let otp = generate_secure_otp(8, DEFAULT_OTP_TTL);
        let debug = format!("{otp:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(otp.plain()));
    }

    #[test]
    fn test_policy_length() {
        let policy = OtpPolicy {
            length: 8,
            ..OtpPolicy::default()
        };
        assert_eq!(policy.generate().plain().len(), 8);
    }
}
