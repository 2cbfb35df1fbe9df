//! Browser session: the portal login and the page-loading seam.
//!
//! [`Browser`] is the trait the rest of the pipeline drives.
//! [`ChromeBrowser`] implements it with headless Chrome.

mod browser;
mod chrome;
mod login;

pub use browser::{Browser, BrowserError};
pub use chrome::ChromeBrowser;
pub use login::{EMAIL_INPUT, LANDING_MARKER, LOGIN_TEXT, PASSWORD_INPUT, login};
