//! Raw-HTML dumps written next to the log file for diagnosis.

use chrono::Local;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

pub struct DebugDumps {
    dir: PathBuf,
    enabled: bool,
}

impl DebugDumps {
    /// `enabled` controls routine page dumps; failure dumps are always written.
    pub fn new(dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            dir: dir.into(),
            enabled,
        }
    }

    /// Saves a page the run fetched successfully, when debug dumps are on.
    pub fn save_page(&self, file_name: &str, html: &str) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        let path = self.write(file_name, html)?;
        info!(path = %path.display(), "Saved page HTML");
        Some(path)
    }

    /// Saves the page that broke the run. Timestamped so repeated failures
    /// do not overwrite each other.
    pub fn save_failure(&self, page: &str, html: &str) -> Option<PathBuf> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let name = format!("structural_{}_{stamp}.html", crate::parser::text::slug(page));
        self.write(&name, html)
    }

    fn write(&self, file_name: &str, html: &str) -> Option<PathBuf> {
        let path = self.dir.join(file_name);
        let result = fs::create_dir_all(&self.dir).and_then(|_| fs::write(&path, html));
        match result {
            Ok(()) => Some(path),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not write HTML dump");
                None
            }
        }
    }
}
