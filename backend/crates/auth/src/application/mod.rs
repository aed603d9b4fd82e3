//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod delete_user;
pub mod forgot_password;
pub mod get_user;
pub mod list_users;
mod mail;
pub mod resend_verification;
pub mod reset_password;
pub mod sign_in;
pub mod sign_up;
pub mod update_password;
pub mod verify_email;

#[cfg(test)]
pub(crate) mod test_support;

use std::fmt;

use crate::domain::entity::user::User;

// Re-exports
pub use authenticate::{AuthenticateUseCase, bearer_token};
pub use config::AuthConfig;
pub use delete_user::DeleteUserUseCase;
pub use forgot_password::ForgotPasswordUseCase;
pub use get_user::GetUserUseCase;
pub use list_users::ListUsersUseCase;
pub use resend_verification::ResendVerificationUseCase;
pub use reset_password::{ResetPasswordInput, ResetPasswordUseCase};
pub use sign_in::{SignInInput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use update_password::{UpdatePasswordInput, UpdatePasswordUseCase};
pub use verify_email::{VerifyEmailInput, VerifyEmailUseCase};

/// A user together with a freshly issued bearer token
pub struct IssuedToken {
    pub user: User,
    pub token: String,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
