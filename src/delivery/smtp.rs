use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;
use tracing::info;

use super::{Delivered, Mailer, OutgoingEmail};
use crate::config::EmailSettings;
use crate::error::PortalError;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends through an authenticated STARTTLS relay, logging in as the sender.
pub struct SmtpMailer {
    from: String,
    server: String,
    port: u16,
    password: String,
}

impl SmtpMailer {
    pub fn new(settings: &EmailSettings) -> Self {
        Self {
            from: settings.from.clone(),
            server: settings.smtp_server.clone(),
            port: settings.smtp_port,
            password: settings.password.clone(),
        }
    }

    fn message(&self, email: &OutgoingEmail) -> Result<Message, PortalError> {
        let from: Mailbox = self
            .from
            .parse()
            .map_err(|e| PortalError::delivery(format!("invalid sender '{}': {e}", self.from)))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| PortalError::delivery(format!("invalid recipient '{}': {e}", email.to)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(PortalError::delivery)
    }
}

impl Mailer for SmtpMailer {
    fn deliver(&self, email: &OutgoingEmail) -> Result<Delivered, PortalError> {
        let message = self.message(email)?;

        let transport = SmtpTransport::starttls_relay(&self.server)
            .map_err(PortalError::delivery)?
            .port(self.port)
            .credentials(Credentials::new(self.from.clone(), self.password.clone()))
            .timeout(Some(SMTP_TIMEOUT))
            .build();
        transport.send(&message).map_err(PortalError::delivery)?;

        info!(to = %email.to, server = %self.server, "Email sent");
        Ok(Delivered::Sent {
            to: email.to.clone(),
        })
    }
}
