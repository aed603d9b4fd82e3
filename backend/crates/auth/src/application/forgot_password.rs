//! Forgot Password Use Case
//!
//! Emails a single-use reset link. Unknown addresses get the same answer
//! as known ones.

use std::sync::Arc;

use platform::otp::generate_secure_token;

use crate::application::config::AuthConfig;
use crate::application::mail;
use crate::domain::mailer::EmailClient;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub struct ForgotPasswordUseCase<R, M>
where
    R: UserRepository,
    M: EmailClient,
{
    repo: Arc<R>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<R, M> ForgotPasswordUseCase<R, M>
where
    R: UserRepository,
    M: EmailClient,
{
    pub fn new(repo: Arc<R>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            mailer,
            config,
        }
    }

    pub async fn execute(&self, email: Option<String>) -> AuthResult<()> {
        let email = email
            .filter(|v| !v.trim().is_empty())
            .ok_or(AuthError::MissingEmail)?;
        let Ok(email) = Email::new(email) else {
            return Ok(());
        };
        let Some(mut user) = self.repo.find_by_email(&email).await? else {
            return Ok(());
        };

        let token = generate_secure_token(self.config.reset_token_bytes, self.config.reset_token_ttl);
        user.set_reset_token(&token);
        self.repo.update(&user).await?;

        let reset_url = self.config.reset_url(token.plain());
        let message = mail::password_reset(&user, &reset_url, self.config.reset_token_ttl);
        if let Err(e) = self.mailer.send(message).await {
            user.clear_reset_token();
            self.repo.update(&user).await?;
            return Err(AuthError::EmailDelivery(Box::new(e)));
        }

        tracing::info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::Harness;
    use platform::otp::hash_secret;

    #[tokio::test]
    async fn test_reset_link_is_emailed_and_hash_stored() {
        let h = Harness::new();
        let user = h.verified_user("jane@example.com").await;

        h.forgot_password().execute(Some("jane@example.com".to_string())).await.unwrap();

        let sent = h.mailer.last().unwrap();
        assert!(sent.text.contains("/api/v1/auth/reset-password/"));
        let token = crate::infra::email::extract_secret(&sent.text, 64).unwrap();

        let stored = h.repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_reset_token, Some(hash_secret(&token)));
        assert!(stored.password_reset_expires.is_some());
    }

    #[tokio::test]
    async fn test_unknown_address_is_silent() {
        let h = Harness::new();
        h.forgot_password().execute(Some("nobody@example.com".to_string())).await.unwrap();
        assert!(h.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_missing_email() {
        let h = Harness::new();
        assert!(matches!(
            h.forgot_password().execute(Some(" ".to_string())).await,
            Err(AuthError::MissingEmail)
        ));
    }

    #[tokio::test]
    async fn test_delivery_failure_clears_token() {
        let h = Harness::new();
        let user = h.verified_user("jane@example.com").await;
        h.mailer.set_failing(true);

        let err = h
            .forgot_password()
            .execute(Some("jane@example.com".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailDelivery(_)));

        let stored = h.repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(stored.password_reset_token.is_none());
    }
}
