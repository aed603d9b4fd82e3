//! Sign In Use Case
//!
//! Email and password login for verified accounts.

use std::sync::Arc;

use platform::password::{ClearTextPassword, PasswordHasher};

use crate::application::IssuedToken;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenSigner;

/// Sign in input
pub struct SignInInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    hasher: PasswordHasher,
    signer: Arc<TokenSigner>,
}

impl<R> SignInUseCase<R>
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

    pub async fn execute(&self, input: SignInInput) -> AuthResult<IssuedToken> {
        let email = input.email.filter(|v| !v.trim().is_empty());
        let password = input.password.filter(|v| !v.is_empty());
        let (Some(email), Some(password)) = (email, password) else {
            return Err(AuthError::MissingCredentials);
        };

        let email = Email::new(email).map_err(|_| AuthError::InvalidCredentials)?;
        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Checked before the password, as in the original flow
        if !user.is_email_verified {
            return Err(AuthError::EmailNotVerified);
        }

        let password = ClearTextPassword::for_verification(password);
        if !self.hasher.verify_blocking(&user.password_hash, password).await {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User signed in");

        let token = self.signer.issue(&user.id)?;
        Ok(IssuedToken { user, token })
    }
}
