//! Report delivery: SMTP for real runs, a file on disk in test mode.

mod file;
mod smtp;

pub use file::FileMailer;
pub use smtp::SmtpMailer;

use std::path::PathBuf;

use crate::error::PortalError;

/// A rendered report ready to hand to a [`Mailer`].
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Delivered {
    Sent { to: String },
    Saved { path: PathBuf },
}

pub trait Mailer {
    fn deliver(&self, email: &OutgoingEmail) -> Result<Delivered, PortalError>;
}
