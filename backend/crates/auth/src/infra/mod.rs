//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod email;
pub mod jwt;
pub mod memory;
pub mod postgres;

pub use email::{HttpEmailClient, LogEmailClient, Mailer, RecordingEmailClient, Sender};
pub use jwt::TokenSigner;
pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;
