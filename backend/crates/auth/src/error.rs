//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please provide email and password!")]
    MissingCredentials,

    /// Same message for unknown email and wrong password
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Please verify your email address before logging in.")]
    EmailNotVerified,

    #[error("An account with this email already exists.")]
    EmailTaken,

    #[error("Could not assign a unique username. Please try again.")]
    UsernameUnavailable,

    #[error("Please provide your email address.")]
    MissingEmail,

    #[error("Please provide email and verification code.")]
    MissingVerificationFields,

    #[error("Invalid or expired verification code")]
    InvalidOtp,

    #[error("Token is invalid or has expired")]
    InvalidResetToken,

    #[error("You are not logged in! Please log in to get access.")]
    NotLoggedIn,

    #[error("Invalid token. Please log in again!")]
    InvalidToken,

    #[error("Your token has expired! Please log in again.")]
    TokenExpired,

    #[error("The user belonging to this token no longer exists.")]
    UserNoLongerExists,

    #[error("User recently changed password! Please log in again.")]
    PasswordChanged,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("Your current password is wrong.")]
    WrongCurrentPassword,

    #[error("No user found with that ID")]
    UserNotFound,

    /// Field-level validation messages, reported together
    #[error("Invalid input data. {}", .0.join(". "))]
    Validation(Vec<String>),

    #[error("There was an error sending the email. Try again later!")]
    EmailDelivery(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingCredentials
            | AuthError::MissingEmail
            | AuthError::MissingVerificationFields
            | AuthError::InvalidOtp
            | AuthError::InvalidResetToken => ErrorKind::BadRequest,
            AuthError::InvalidCredentials
            | AuthError::EmailNotVerified
            | AuthError::NotLoggedIn
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::UserNoLongerExists
            | AuthError::PasswordChanged
            | AuthError::WrongCurrentPassword => ErrorKind::Unauthorized,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken | AuthError::UsernameUnavailable => ErrorKind::Conflict,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::EmailDelivery(_) => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
            AuthError::App(err) => err.kind(),
        }
    }

    /// Convert to AppError
    pub fn into_app_error(self) -> AppError {
        let kind = self.kind();
        let message = self.to_string();
        match self {
            AuthError::App(err) => err,
            AuthError::Database(err) => AppError::from(err),
            AuthError::Validation(messages) => AppError::validation(messages),
            AuthError::EmailNotVerified => AppError::new(kind, message)
                .with_action("Check your inbox for the verification code or request a new one."),
            AuthError::InvalidOtp => AppError::new(kind, message)
                .with_action("Request a new code from /api/v1/auth/resend-verification."),
            AuthError::EmailDelivery(source) => AppError::new(kind, message)
                .operational()
                .with_source(BoxedSource(source)),
            AuthError::Internal(detail) => {
                AppError::internal("Internal error").with_source(BoxedSource(detail.into()))
            }
            _ => AppError::new(kind, message),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::EmailDelivery(e) => {
                tracing::warn!(error = %e, "Email delivery failed");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidToken | AuthError::PasswordChanged => {
                tracing::warn!(error = %self, "Rejected bearer token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

/// Carries a boxed error as an `AppError` source.
#[derive(Debug)]
struct BoxedSource(Box<dyn std::error::Error + Send + Sync>);

impl std::fmt::Display for BoxedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for BoxedSource {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::MissingCredentials.kind(), ErrorKind::BadRequest);
        assert_eq!(AuthError::InvalidCredentials.kind(), ErrorKind::Unauthorized);
        assert_eq!(AuthError::EmailNotVerified.kind(), ErrorKind::Unauthorized);
        assert_eq!(AuthError::EmailTaken.kind(), ErrorKind::Conflict);
        assert_eq!(AuthError::Forbidden.kind(), ErrorKind::Forbidden);
        assert_eq!(AuthError::UserNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            AuthError::Validation(vec!["x".into()]).kind(),
            ErrorKind::BadRequest
        );
    }

    #[test]
    fn test_validation_message_is_aggregated() {
        let err = AuthError::Validation(vec![
            "Your name is required".into(),
            "Passwords do not match".into(),
        ])
        .into_app_error();
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.message(),
            "Invalid input data. Your name is required. Passwords do not match"
        );
    }

    #[test]
    fn test_email_delivery_is_operational_503() {
        let err = AuthError::EmailDelivery("smtp down".into()).into_app_error();
        assert_eq!(err.status_code(), 503);
        assert!(err.is_operational());
        assert_eq!(
            err.message(),
            "There was an error sending the email. Try again later!"
        );
    }

    #[test]
    fn test_verification_errors_carry_an_action() {
        let err = AuthError::InvalidOtp.into_app_error();
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.action(),
            Some("Request a new code from /api/v1/auth/resend-verification.")
        );
        assert!(AuthError::EmailNotVerified.into_app_error().action().is_some());
        assert!(AuthError::InvalidCredentials.into_app_error().action().is_none());
    }

    #[test]
    fn test_internal_is_not_operational() {
        let err = AuthError::Internal("boom".into()).into_app_error();
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_operational());
    }

    #[test]
    fn test_app_error_passes_through() {
        let err = AuthError::from(AppError::bad_request("Invalid id: abc.")).into_app_error();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Invalid id: abc.");
    }
}
