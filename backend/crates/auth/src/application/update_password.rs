//! Update Password Use Case
//!
//! Password rotation for a signed-in user.

use std::sync::Arc;

use kernel::id::UserId;
use platform::password::{ClearTextPassword, PasswordHasher};

use crate::application::IssuedToken;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_password::NewPassword;
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::TokenSigner;

pub struct UpdatePasswordInput {
    pub current_password: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

pub struct UpdatePasswordUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    hasher: PasswordHasher,
    signer: Arc<TokenSigner>,
}

impl<R> UpdatePasswordUseCase<R>
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

    pub async fn execute(&self, user_id: &UserId, input: UpdatePasswordInput) -> AuthResult<IssuedToken> {
        // Fresh copy: the one from the request may be stale
        let mut user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNoLongerExists)?;

        let current = ClearTextPassword::for_verification(input.current_password.unwrap_or_default());
        if !self.hasher.verify_blocking(&user.password_hash, current).await {
            return Err(AuthError::WrongCurrentPassword);
        }

        let password = NewPassword::new(input.password, input.password_confirm)
            .map_err(AuthError::Validation)?;
        let password_hash = self.hasher.hash_blocking(password.into_inner()).await?;

        user.set_password(password_hash);
        self.repo.update(&user).await?;

        tracing::info!(user_id = %user.id, "Password updated");

        let token = self.signer.issue(&user.id)?;
        Ok(IssuedToken { user, token })
    }
}
