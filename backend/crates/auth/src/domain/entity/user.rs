//! User Entity
//!
//! Plain data. Hashing, token signing and persistence happen in the use
//! cases; the methods here only keep related fields consistent (a new
//! password clears any pending reset, verification clears the code).

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::otp::OneTimeSecret;
use platform::password::HashedPassword;
use serde::Serialize;

use crate::domain::value_object::{
    email::Email, full_name::FullName, user_name::UserName, user_role::UserRole,
};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: FullName,
    /// Unique public handle
    pub user_name: UserName,
    pub email: Email,
    pub role: UserRole,
    pub password_hash: HashedPassword,
    pub is_email_verified: bool,
    /// SHA-256 of the pending verification code
    pub email_verification_otp: Option<String>,
    pub email_verification_otp_expires: Option<DateTime<Utc>>,
    pub password_changed_at: Option<DateTime<Utc>>,
    /// SHA-256 of the pending reset token
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Unverified account with the default role
    pub fn new(
        name: FullName,
        user_name: UserName,
        email: Email,
        password_hash: HashedPassword,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: UserId::new(),
            name,
            user_name,
            email,
            role: UserRole::default(),
            password_hash,
            is_email_verified: false,
            email_verification_otp: None,
            email_verification_otp_expires: None,
            password_changed_at: None,
            password_reset_token: None,
            password_reset_expires: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_verification_otp(&mut self, otp: &OneTimeSecret) {
        self.email_verification_otp = Some(otp.hashed().to_string());
        self.email_verification_otp_expires = Some(otp.expires_at());
        self.touch();
    }

    pub fn clear_verification_otp(&mut self) {
        self.email_verification_otp = None;
        self.email_verification_otp_expires = None;
        self.touch();
    }

    pub fn mark_email_verified(&mut self) {
        self.is_email_verified = true;
        self.clear_verification_otp();
    }

    /// True when `hashed` is the pending code and it has not expired.
    pub fn verification_otp_matches(&self, hashed: &str, now: DateTime<Utc>) -> bool {
        secret_matches(
            self.email_verification_otp.as_deref(),
            self.email_verification_otp_expires,
            hashed,
            now,
        )
    }

    pub fn set_reset_token(&mut self, token: &OneTimeSecret) {
        self.password_reset_token = Some(token.hashed().to_string());
        self.password_reset_expires = Some(token.expires_at());
        self.touch();
    }

    pub fn clear_reset_token(&mut self) {
        self.password_reset_token = None;
        self.password_reset_expires = None;
        self.touch();
    }

    pub fn reset_token_matches(&self, hashed: &str, now: DateTime<Utc>) -> bool {
        secret_matches(
            self.password_reset_token.as_deref(),
            self.password_reset_expires,
            hashed,
            now,
        )
    }

    /// Replace the password; tokens issued before now stop working.
    pub fn set_password(&mut self, password_hash: HashedPassword) {
        self.password_hash = password_hash;
        self.password_changed_at = Some(Utc::now());
        self.clear_reset_token();
    }

    /// Whether the password changed after a token issued at `issued_at_ms`
    /// (Unix milliseconds).
    pub fn changed_password_after(&self, issued_at_ms: i64) -> bool {
        self.password_changed_at
            .is_some_and(|changed| issued_at_ms < changed.timestamp_millis())
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.as_str().to_string(),
            username: self.user_name.as_str().to_string(),
            email: self.email.as_str().to_string(),
            role: self.role,
            is_email_verified: self.is_email_verified,
            password_changed_at: self.password_changed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn secret_matches(
    stored: Option<&str>,
    expires: Option<DateTime<Utc>>,
    hashed: &str,
    now: DateTime<Utc>,
) -> bool {
    match (stored, expires) {
        (Some(stored), Some(expires)) => {
            expires > now && platform::crypto::constant_time_eq(stored.as_bytes(), hashed.as_bytes())
        }
        _ => false,
    }
}

/// What clients may see of a user. Password hash, codes and tokens are
/// not part of it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub is_email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use platform::password::{ClearTextPassword, HashParams, PasswordHasher};

    pub const PASSWORD: &str = "Pass1234!";

    pub fn hasher() -> PasswordHasher {
        PasswordHasher::new(HashParams::minimal()).unwrap()
    }

    pub fn hashed(password: &str) -> HashedPassword {
        hasher()
            .hash(&ClearTextPassword::new(password.to_string()).unwrap())
            .unwrap()
    }

    pub fn user(email: &str) -> User {
        User::new(
            FullName::new("Jane Doe").unwrap(),
            UserName::derive("Jane Doe"),
            Email::new(email).unwrap(),
            hashed(PASSWORD),
        )
    }

    pub fn verified_user(email: &str) -> User {
        let mut user = user(email);
        user.mark_email_verified();
        user
    }
}
