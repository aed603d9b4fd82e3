//! Authenticate Use Case
//!
//! Resolves a bearer token to the user it was issued for.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenSigner;

const BEARER_PREFIX: &str = "Bearer ";

/// Token from an `Authorization` header value, if it uses the Bearer scheme.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub struct AuthenticateUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    signer: Arc<TokenSigner>,
}

impl<R> AuthenticateUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, signer: Arc<TokenSigner>) -> Self {
        Self { repo, signer }
    }

    /// `authorization` is the raw header value.
    pub async fn execute(&self, authorization: Option<&str>) -> AuthResult<User> {
        let token = bearer_token(authorization).ok_or(AuthError::NotLoggedIn)?;
        let claims = self.signer.verify(token)?;
        let user_id = claims.user_id()?;

        let user = self
            .repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::UserNoLongerExists)?;

        if user.changed_password_after(claims.iat_ms) {
            return Err(AuthError::PasswordChanged);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::Harness;
    use crate::domain::entity::user::fixtures;
    use chrono::{TimeDelta, Utc};

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("bearer abc")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let h = Harness::new();
        let user = h.verified_user("jane@example.com").await;
        let header = format!("Bearer {}", h.signer.issue(&user.id).unwrap());

        let found = h.authenticate().execute(Some(&header)).await.unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_missing_and_malformed_tokens() {
        let h = Harness::new();
        assert!(matches!(
            h.authenticate().execute(None).await,
            Err(AuthError::NotLoggedIn)
        ));
        assert!(matches!(
            h.authenticate().execute(Some("Bearer not.a.jwt")).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_deleted_user() {
        let h = Harness::new();
        let user = h.verified_user("jane@example.com").await;
        let header = format!("Bearer {}", h.signer.issue(&user.id).unwrap());
        h.repo.delete(&user.id).await.unwrap();

        assert!(matches!(
            h.authenticate().execute(Some(&header)).await,
            Err(AuthError::UserNoLongerExists)
        ));
    }

    #[tokio::test]
    async fn test_token_older_than_password_change() {
        let h = Harness::new();
        let mut user = h.verified_user("jane@example.com").await;
        let old = h
            .signer
            .issue_at(&user.id, Utc::now() - TimeDelta::seconds(5))
            .unwrap();

        user.set_password(fixtures::hashed("NewPass123!"));
        h.repo.update(&user).await.unwrap();

        let err = h
            .authenticate()
            .execute(Some(&format!("Bearer {old}")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordChanged));

        let fresh = h.signer.issue(&user.id).unwrap();
        assert!(h.authenticate().execute(Some(&format!("Bearer {fresh}"))).await.is_ok());
    }
}
