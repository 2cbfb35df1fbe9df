//! Run configuration, read from the process environment (after `.env`).

use anyhow::{Context, Result, bail};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LOG_DIR: &str = "logs";

pub struct PortalCredentials {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for PortalCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalCredentials")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    /// Page-load and element-wait limit. Exceeding it fails the run.
    pub page_timeout: Duration,
}

pub struct EmailSettings {
    /// Write the report to a file instead of sending it.
    pub test_mode: bool,
    pub recipient: String,
    pub from: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub password: String,
}

impl fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSettings")
            .field("test_mode", &self.test_mode)
            .field("recipient", &self.recipient)
            .field("from", &self.from)
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
pub struct Config {
    pub portal: PortalCredentials,
    pub student_name: String,
    pub browser: BrowserOptions,
    pub save_debug_html: bool,
    pub email: EmailSettings,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    ///
    /// # Errors
    ///
    /// Fails when a required portal variable is unset or a value does not parse.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            match get(key) {
                Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
                _ => bail!("Missing required environment variable: {key}"),
            }
        };
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let portal = PortalCredentials {
            url: required("TEACHEREASE_URL")?,
            username: required("TEACHEREASE_USERNAME")?,
            password: required("TEACHEREASE_PASSWORD")?,
        };

        let timeout_secs: u64 = or("PAGE_TIMEOUT_SECS", "60")
            .trim()
            .parse()
            .context("PAGE_TIMEOUT_SECS must be a whole number of seconds")?;

        let email = EmailSettings {
            test_mode: parse_bool("EMAIL_TEST_MODE", &or("EMAIL_TEST_MODE", "true"))?,
            recipient: or("EMAIL_RECIPIENT", "test@example.com"),
            from: or("EMAIL_FROM", "sender@example.com"),
            smtp_server: or("EMAIL_SMTP_SERVER", "smtp.gmail.com"),
            smtp_port: or("EMAIL_SMTP_PORT", "587")
                .trim()
                .parse()
                .context("EMAIL_SMTP_PORT must be a port number")?,
            password: or("EMAIL_PASSWORD", ""),
        };

        Ok(Config {
            portal,
            student_name: or("STUDENT_NAME", "Student"),
            browser: BrowserOptions {
                headless: parse_bool("HEADLESS_BROWSER", &or("HEADLESS_BROWSER", "true"))?,
                page_timeout: Duration::from_secs(timeout_secs),
            },
            save_debug_html: parse_bool("SAVE_DEBUG_HTML", &or("SAVE_DEBUG_HTML", "true"))?,
            email,
            log_dir: log_dir_from(&get),
        })
    }
}

/// Log directory, needed before the rest of the config is loaded.
pub fn log_dir_from<F>(get: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    get("LOG_DIR")
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => bail!("{key} must be true or false, got '{other}'"),
    }
}
