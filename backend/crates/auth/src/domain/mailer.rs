//! Outgoing mail
//!
//! Implementations live in `infra::email`.

use thiserror::Error;

use crate::domain::value_object::email::Email;

/// A plain-text message to one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: Email,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Mail transport failed: {0}")]
    Transport(String),

    #[error("Mail API rejected the message with status {status}")]
    Rejected { status: u16 },
}

#[trait_variant::make(EmailClient: Send)]
pub trait LocalEmailClient {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}
