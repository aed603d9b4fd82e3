//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use kernel::query::ListQuery;

use crate::domain::entity::user::User;
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::AuthResult;

/// User repository trait
///
/// `email` and `user_name` are unique; `create` and `update` report a
/// violation as a 409 through [`crate::error::AuthError`].
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()>;

    async fn find_by_id(&self, id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// User with this email whose pending code hashes to `otp_hash` and
    /// has not expired at `now`
    async fn find_by_verification_otp(
        &self,
        email: &Email,
        otp_hash: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<User>>;

    /// User whose pending reset token hashes to `token_hash` and has not
    /// expired at `now`
    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool>;

    async fn update(&self, user: &User) -> AuthResult<()>;

    /// `false` when no such user
    async fn delete(&self, id: &UserId) -> AuthResult<bool>;

    /// One page of `query` (filter, sort, skip, limit)
    async fn find_page(&self, query: &ListQuery) -> AuthResult<Vec<User>>;

    /// Number of users matching `query.filter`
    async fn count(&self, query: &ListQuery) -> AuthResult<u64>;
}
