//! Shared wiring for use case tests

use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::application::config::AuthConfig;
use crate::application::{
    AuthenticateUseCase, DeleteUserUseCase, ForgotPasswordUseCase, GetUserUseCase,
    ListUsersUseCase, ResendVerificationUseCase, ResetPasswordUseCase, SignInUseCase,
    SignUpInput, SignUpUseCase, UpdatePasswordUseCase, VerifyEmailUseCase,
};
use crate::domain::entity::user::{User, fixtures};
use crate::domain::repository::UserRepository;
use crate::infra::email::RecordingEmailClient;
use crate::infra::jwt::TokenSigner;
use crate::infra::memory::InMemoryUserRepository;

pub(crate) fn sign_up_input(email: &str) -> SignUpInput {
    SignUpInput {
        name: Some("Jane Doe".to_string()),
        email: Some(email.to_string()),
        password: Some(fixtures::PASSWORD.to_string()),
        password_confirm: Some(fixtures::PASSWORD.to_string()),
    }
}

pub(crate) struct Harness {
    pub repo: Arc<InMemoryUserRepository>,
    pub mailer: Arc<RecordingEmailClient>,
    pub config: Arc<AuthConfig>,
    pub hasher: PasswordHasher,
    pub signer: Arc<TokenSigner>,
}

impl Harness {
    pub fn new() -> Self {
        let config = Arc::new(AuthConfig::for_tests());
        Self {
            repo: Arc::new(InMemoryUserRepository::new()),
            mailer: Arc::new(RecordingEmailClient::new()),
            hasher: PasswordHasher::new(config.hash_params).unwrap(),
            signer: Arc::new(TokenSigner::new(&config).unwrap()),
            config,
        }
    }

    /// Stores a verified user with the fixture password
    pub async fn verified_user(&self, email: &str) -> User {
        let user = fixtures::verified_user(email);
        self.repo.create(&user).await.unwrap();
        user
    }

    pub fn sign_up(&self) -> SignUpUseCase<InMemoryUserRepository, RecordingEmailClient> {
        SignUpUseCase::new(
            self.repo.clone(),
            self.mailer.clone(),
            self.hasher.clone(),
            self.config.clone(),
        )
    }

    pub fn verify_email(&self) -> VerifyEmailUseCase<InMemoryUserRepository> {
        VerifyEmailUseCase::new(self.repo.clone(), self.signer.clone())
    }

    pub fn resend(&self) -> ResendVerificationUseCase<InMemoryUserRepository, RecordingEmailClient> {
        ResendVerificationUseCase::new(self.repo.clone(), self.mailer.clone(), self.config.clone())
    }

    pub fn sign_in(&self) -> SignInUseCase<InMemoryUserRepository> {
        SignInUseCase::new(self.repo.clone(), self.hasher.clone(), self.signer.clone())
    }

    pub fn authenticate(&self) -> AuthenticateUseCase<InMemoryUserRepository> {
        AuthenticateUseCase::new(self.repo.clone(), self.signer.clone())
    }

    pub fn forgot_password(
        &self,
    ) -> ForgotPasswordUseCase<InMemoryUserRepository, RecordingEmailClient> {
        ForgotPasswordUseCase::new(self.repo.clone(), self.mailer.clone(), self.config.clone())
    }

    pub fn reset_password(&self) -> ResetPasswordUseCase<InMemoryUserRepository> {
        ResetPasswordUseCase::new(self.repo.clone(), self.hasher.clone(), self.signer.clone())
    }

    pub fn update_password(&self) -> UpdatePasswordUseCase<InMemoryUserRepository> {
        UpdatePasswordUseCase::new(self.repo.clone(), self.hasher.clone(), self.signer.clone())
    }

    pub fn list_users(&self) -> ListUsersUseCase<InMemoryUserRepository> {
        ListUsersUseCase::new(self.repo.clone())
    }

    pub fn get_user(&self) -> GetUserUseCase<InMemoryUserRepository> {
        GetUserUseCase::new(self.repo.clone())
    }

    pub fn delete_user(&self) -> DeleteUserUseCase<InMemoryUserRepository> {
        DeleteUserUseCase::new(self.repo.clone())
    }
}
