//! Domain Layer
//!
//! Contains entities, value objects, and the repository and mail traits.

pub mod entity;
pub mod mailer;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::user::{User, UserProfile};
pub use mailer::{EmailClient, EmailMessage};
pub use repository::UserRepository;
