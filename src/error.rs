//! Failure taxonomy for a single digest run.
//!
//! Every variant is fatal: the run logs it and exits non-zero. Nothing is
//! retried and nothing is delivered after one of these is raised.

use std::fmt;

/// Errors raised by the scrape → parse → classify → deliver pipeline.
#[derive(Debug)]
pub enum PortalError {
    /// Bad credentials, or the login page no longer looks the way we expect.
    AuthenticationFailure { reason: String },
    /// An element the navigator relies on is gone from a portal page.
    StructuralChange { page: String, expected: String },
    /// A fragment was found but could not be decoded.
    Parse { fragment: String, reason: String },
    /// The rendered report could not be sent or written.
    Delivery { reason: String },
    /// Browser launch, navigation or page-load timeout.
    Session(anyhow::Error),
}

impl PortalError {
    /// Short, stable label used as the `kind` field in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PortalError::AuthenticationFailure { .. } => "authentication_failure",
            PortalError::StructuralChange { .. } => "structural_change",
            PortalError::Parse { .. } => "parse_error",
            PortalError::Delivery { .. } => "delivery_error",
            PortalError::Session(_) => "session_error",
        }
    }

    pub(crate) fn parse(fragment: impl Into<String>, reason: impl fmt::Display) -> Self {
        PortalError::Parse {
            fragment: fragment.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn delivery(reason: impl fmt::Display) -> Self {
        PortalError::Delivery {
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalError::AuthenticationFailure { reason } => {
                write!(f, "authentication failed: {reason}")
            }
            PortalError::StructuralChange { page, expected } => {
                write!(f, "portal markup changed on {page}: expected {expected}")
            }
            PortalError::Parse { fragment, reason } => {
                write!(f, "could not parse {fragment}: {reason}")
            }
            PortalError::Delivery { reason } => write!(f, "report delivery failed: {reason}"),
            PortalError::Session(e) => write!(f, "browser session failed: {e:#}"),
        }
    }
}

impl std::error::Error for PortalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PortalError::Session(e) => Some(&**e),
            _ => None,
        }
    }
}
