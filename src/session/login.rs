use tracing::{debug, error, info};

use super::browser::{Browser, BrowserError};
use crate::config::PortalCredentials;
use crate::error::PortalError;

pub const EMAIL_INPUT: &str = r#"input[placeholder="Email Address"]"#;
pub const PASSWORD_INPUT: &str = r#"input[placeholder="Password"]"#;
pub const LOGIN_TEXT: &str = "Log In";
/// Only rendered once the parent account is signed in.
pub const LANDING_MARKER: &str = "Student Main";

/// Signs in through the portal's login form. A single attempt; no retries.
///
/// # Errors
///
/// `AuthenticationFailure` when a login element is missing or the landing
/// page never appears, `Session` when the browser itself fails.
#[tracing::instrument(skip_all, fields(username = %credentials.username))]
pub fn login<B: Browser>(browser: &mut B, credentials: &PortalCredentials) -> Result<(), PortalError> {
    info!(url = %credentials.url, "Opening portal");
    browser.goto(&credentials.url).map_err(login_error)?;

    browser.click_text("a", LOGIN_TEXT).map_err(login_error)?;
    browser
        .fill(EMAIL_INPUT, &credentials.username)
        .map_err(login_error)?;
    browser
        .fill(PASSWORD_INPUT, &credentials.password)
        .map_err(login_error)?;
    browser.click_text("button", LOGIN_TEXT).map_err(login_error)?;

    let landing = browser.content().map_err(login_error)?;
    if !landing.contains(LANDING_MARKER) {
        error!(url = %browser.current_url(), "Login failed");
        debug!(html = %landing, "Post-login page");
        return Err(PortalError::AuthenticationFailure {
            reason: format!("landing page did not show '{LANDING_MARKER}'"),
        });
    }

    info!("Login successful");
    Ok(())
}

fn login_error(e: BrowserError) -> PortalError {
    match e {
        BrowserError::ElementNotFound { target, .. } => PortalError::AuthenticationFailure {
            reason: format!("login page changed: {target} not found"),
        },
        BrowserError::Navigation(e) => PortalError::Session(e),
    }
}
