//! Resend Verification Use Case
//!
//! Replaces the pending code of an unverified account. The caller always
//! gets the same neutral answer, whether or not the address is known.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::mail;
use crate::domain::mailer::EmailClient;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub struct ResendVerificationUseCase<R, M>
where
    R: UserRepository,
    M: EmailClient,
{
    repo: Arc<R>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<R, M> ResendVerificationUseCase<R, M>
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
        if user.is_email_verified {
            return Ok(());
        }

        let otp = self.config.otp.generate();
        user.set_verification_otp(&otp);
        self.repo.update(&user).await?;

        let message = mail::verification_code(&user, otp.plain(), self.config.otp.ttl);
        if let Err(e) = self.mailer.send(message).await {
            user.clear_verification_otp();
            self.repo.update(&user).await?;
            return Err(AuthError::EmailDelivery(Box::new(e)));
        }

        tracing::info!(user_id = %user.id, "Verification code resent");
        Ok(())
    }
}
