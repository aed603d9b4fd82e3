//! Reset Password Use Case
//!
//! Redeems a reset token for a new password and a fresh bearer token.

use std::sync::Arc;

use chrono::Utc;
use platform::otp::hash_secret;
use platform::password::PasswordHasher;

use crate::application::IssuedToken;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_password::NewPassword;
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenSigner;

pub struct ResetPasswordInput {
    /// Plain token from the emailed link
    pub token: String,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

pub struct ResetPasswordUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    hasher: PasswordHasher,
    signer: Arc<TokenSigner>,
}

impl<R> ResetPasswordUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, hasher: PasswordHasher, signer: Arc<TokenSigner>) -> Self {
        Self {
            repo,
            hasher,
            signer,
        }
    }

    pub async fn execute(&self, input: ResetPasswordInput) -> AuthResult<IssuedToken> {
        let token_hash = hash_secret(input.token.trim());
        let mut user = self
            .repo
            .find_by_reset_token(&token_hash, Utc::now())
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        let password = NewPassword::new(input.password, input.password_confirm)
            .map_err(AuthError::Validation)?;
        let password_hash = self.hasher.hash_blocking(password.into_inner()).await?;

        user.set_password(password_hash);
        self.repo.update(&user).await?;

        tracing::info!(user_id = %user.id, "Password reset");

        let token = self.signer.issue(&user.id)?;
        Ok(IssuedToken { user, token })
    }
}
