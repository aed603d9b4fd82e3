//! Sign Up Use Case
//!
//! Creates an unverified account and emails a verification code.

use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::application::config::{AuthConfig, USER_NAME_ATTEMPTS};
use crate::application::mail;
use crate::domain::entity::user::User;
use crate::domain::mailer::EmailClient;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, full_name::FullName, user_name::UserName, user_password::NewPassword,
};
use crate::error::{AuthError, AuthResult};

/// Sign up input. Missing fields are validation errors, not parse errors.
#[derive(Default)]
pub struct SignUpInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub user: User,
    /// `false` when delivery failed; the user has to request a new code
    pub verification_sent: bool,
}

/// Sign up use case
pub struct SignUpUseCase<R, M>
where
    R: UserRepository,
    M: EmailClient,
{
    repo: Arc<R>,
    mailer: Arc<M>,
    hasher: PasswordHasher,
    config: Arc<AuthConfig>,
}

impl<R, M> SignUpUseCase<R, M>
where
    R: UserRepository,
    M: EmailClient,
{
    pub fn new(repo: Arc<R>, mailer: Arc<M>, hasher: PasswordHasher, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            mailer,
            hasher,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let email = Email::new(input.email.unwrap_or_default());

        // Existing account first, so the answer does not depend on the other fields
        if let Ok(email) = &email {
            if self.repo.exists_by_email(email).await? {
                return Err(AuthError::EmailTaken);
            }
        }

        let mut errors = Vec::new();
        let name = FullName::new(input.name.unwrap_or_default())
            .map_err(|e| errors.push(e.to_string()))
            .ok();
        let email = email.map_err(|e| errors.push(e.to_string())).ok();
        let password = NewPassword::new(input.password, input.password_confirm)
            .map_err(|e| errors.extend(e))
            .ok();

        let (Some(name), Some(email), Some(password)) = (name, email, password) else {
            return Err(AuthError::Validation(errors));
        };

        let password_hash = self.hasher.hash_blocking(password.into_inner()).await?;
        let user_name = self.assign_user_name(&name).await?;

        let otp = self.config.otp.generate();
        let mut user = User::new(name, user_name, email, password_hash);
        user.set_verification_otp(&otp);

        self.repo.create(&user).await?;

        tracing::info!(
            user_id = %user.id,
            user_name = %user.user_name,
            "User signed up"
        );

        let message = mail::verification_code(&user, otp.plain(), self.config.otp.ttl);
        let verification_sent = match self.mailer.send(message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Verification email not delivered");
                user.clear_verification_otp();
                self.repo.update(&user).await?;
                false
            }
        };

        Ok(SignUpOutput {
            user,
            verification_sent,
        })
    }

    /// Short suffixes first; the store's unique index is the final word.
    async fn assign_user_name(&self, name: &FullName) -> AuthResult<UserName> {
        for _ in 0..USER_NAME_ATTEMPTS {
            let candidate = UserName::derive(name.as_str());
            if !self.repo.exists_by_user_name(&candidate).await? {
                return Ok(candidate);
            }
        }

        let candidate = UserName::derive_long(name.as_str());
        if self.repo.exists_by_user_name(&candidate).await? {
            return Err(AuthError::UsernameUnavailable);
        }
        Ok(candidate)
    }
}
