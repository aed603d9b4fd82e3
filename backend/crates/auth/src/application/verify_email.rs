//! Verify Email Use Case
//!
//! Exchanges the emailed code for a verified account and a token.

use std::sync::Arc;

use chrono::Utc;
use platform::otp::hash_secret;

use crate::application::IssuedToken;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenSigner;

pub struct VerifyEmailInput {
    pub email: Option<String>,
    pub otp: Option<String>,
}

pub struct VerifyEmailUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    signer: Arc<TokenSigner>,
}

impl<R> VerifyEmailUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, signer: Arc<TokenSigner>) -> Self {
        Self { repo, signer }
    }

    pub async fn execute(&self, input: VerifyEmailInput) -> AuthResult<IssuedToken> {
        let email = input.email.filter(|v| !v.trim().is_empty());
        let otp = input.otp.filter(|v| !v.trim().is_empty());
        let (Some(email), Some(otp)) = (email, otp) else {
            return Err(AuthError::MissingVerificationFields);
        };

        // A malformed address cannot match anything
        let email = Email::new(email).map_err(|_| AuthError::InvalidOtp)?;
        let otp_hash = hash_secret(otp.trim());

        let mut user = self
            .repo
            .find_by_verification_otp(&email, &otp_hash, Utc::now())
            .await?
            .ok_or(AuthError::InvalidOtp)?;

        user.mark_email_verified();
        self.repo.update(&user).await?;

        tracing::info!(user_id = %user.id, "Email verified");

        let token = self.signer.issue(&user.id)?;
        Ok(IssuedToken { user, token })
    }
}
