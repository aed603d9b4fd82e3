//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database, token and email implementations
//! - `presentation/` - HTTP handlers, DTOs, router, guards
//!
//! ## Features
//! - Signup with emailed one-time verification code
//! - Email + password login for verified accounts
//! - HS256 bearer tokens; `protect` and `restrict_to` route guards
//! - Password reset by emailed link, password rotation
//! - Admin user listing with the shared query language
//!
//! ## Security Model
//! - Passwords hashed with Argon2id on the blocking pool
//! - Codes and reset tokens stored as SHA-256 hashes with an expiry
//! - Tokens issued before the last password change are rejected
//! - Unknown email and wrong password produce the same answer

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::value_object::user_role::UserRole;
pub use error::{AuthError, AuthResult};
pub use infra::{
    HttpEmailClient, InMemoryUserRepository, LogEmailClient, Mailer, PgUserRepository,
    RecordingEmailClient, Sender, TokenSigner,
};
pub use presentation::{AuthAppState, AuthGuard, CurrentUser, auth_router, users_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
