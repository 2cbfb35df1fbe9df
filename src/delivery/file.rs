use chrono::Local;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use super::{Delivered, Mailer, OutgoingEmail};
use crate::error::PortalError;

/// Test-mode mailer: writes the message to `email_report_<timestamp>.txt`.
pub struct FileMailer {
    dir: PathBuf,
}

impl FileMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Mailer for FileMailer {
    fn deliver(&self, email: &OutgoingEmail) -> Result<Delivered, PortalError> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self.dir.join(format!("email_report_{stamp}.txt"));

        let contents = format!(
            "To: {}\nSubject: {}\n\n{}",
            email.to, email.subject, email.body
        );
        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(&path, contents))
            .map_err(|e| PortalError::delivery(format!("{}: {e}", path.display())))?;

        info!(path = %path.display(), subject = %email.subject, to = %email.to, "Email saved to file (test mode)");
        Ok(Delivered::Saved { path })
    }
}
