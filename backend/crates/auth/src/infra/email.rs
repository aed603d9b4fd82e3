//! Mail transports
//!
//! - [`HttpEmailClient`]: Postmark-style JSON API
//! - [`LogEmailClient`]: logs instead of sending (development without a mail API)
//! - [`RecordingEmailClient`]: keeps messages in memory (tests)
//! - [`Mailer`]: one of the above, picked at startup

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;

use crate::domain::mailer::{EmailClient, EmailError, EmailMessage};

const MESSAGE_STREAM: &str = "outbound";
const POSTMARK_AUTH_HEADER: &str = "X-Postmark-Server-Token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `Name <address>` shown as the sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub name: String,
    pub address: String,
}

impl Sender {
    pub fn mailbox(&self) -> String {
        if self.name.is_empty() {
            self.address.clone()
        } else {
            format!("{} <{}>", self.name, self.address)
        }
    }
}

pub struct HttpEmailClient {
    http_client: Client,
    url: Url,
    sender: Sender,
    authorization_token: Secret<String>,
}

impl HttpEmailClient {
    pub fn new(
        base_url: &str,
        sender: Sender,
        authorization_token: Secret<String>,
    ) -> Result<Self, EmailError> {
        let url = Url::parse(base_url)
            .and_then(|base| base.join("/email"))
            .map_err(|e| EmailError::Transport(format!("Invalid mail API url: {e}")))?;
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            url,
            sender,
            authorization_token,
        })
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text_body: &'a str,
    message_stream: &'a str,
}

impl EmailClient for HttpEmailClient {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let from = self.sender.mailbox();
        let body = SendEmailRequest {
            from: &from,
            to: message.to.as_str(),
            subject: &message.subject,
            text_body: &message.text,
            message_stream: MESSAGE_STREAM,
        };

        let response = self
            .http_client
            .post(self.url.clone())
            .header(POSTMARK_AUTH_HEADER, self.authorization_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmailError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::info!(subject = %message.subject, "Email sent");
        Ok(())
    }
}

/// Writes the message to the log instead of sending it. The body carries
/// codes and reset links, so it is only logged (at `debug`) when
/// [`LogEmailClient::with_body`] was chosen for local development.
#[derive(Debug, Clone, Default)]
pub struct LogEmailClient {
    show_body: bool,
}

impl LogEmailClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body() -> Self {
        Self { show_body: true }
    }

    fn body<'a>(&self, message: &'a EmailMessage) -> Option<&'a str> {
        self.show_body.then_some(message.text.as_str())
    }
}

impl EmailClient for LogEmailClient {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email (not sent, no mail API configured)"
        );
        if let Some(text) = self.body(&message) {
            tracing::debug!(to = %message.to, text = %text, "Email body");
        }
        Ok(())
    }
}

/// Keeps every message; can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmailClient {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingEmailClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<EmailMessage> {
        self.sent().pop()
    }
}

impl EmailClient for RecordingEmailClient {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmailError::Transport("recording client set to fail".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        Ok(())
    }
}

/// Transport chosen from configuration
pub enum Mailer {
    Http(HttpEmailClient),
    Log(LogEmailClient),
    Recording(RecordingEmailClient),
}

impl EmailClient for Mailer {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        match self {
            Mailer::Http(client) => client.send(message).await,
            Mailer::Log(client) => client.send(message).await,
            Mailer::Recording(client) => client.send(message).await,
        }
    }
}

/// Pull a one-time code or hex token of `length` characters out of a
/// message body. Tests only.
#[cfg(test)]
pub(crate) fn extract_secret(text: &str, length: usize) -> Option<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .find(|word| {
            word.len() == length
                && word.chars().all(|c| c.is_ascii_hexdigit())
                && word.chars().any(|c| c.is_ascii_digit())
        })
        .map(str::to_string)
}
