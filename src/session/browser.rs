use std::fmt;

/// The one I/O boundary of the pipeline: a page-at-a-time browser.
///
/// Implementations block until each action has settled (page loaded or
/// element found) or their page-load timeout elapses.
pub trait Browser {
    /// Loads `url` in the current tab.
    fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Clicks the first `tag` element whose visible text contains `text`,
    /// then waits for any navigation it triggered.
    fn click_text(&mut self, tag: &str, text: &str) -> Result<(), BrowserError>;

    /// Types `value` into the element matched by the CSS `selector`.
    fn fill(&mut self, selector: &str, value: &str) -> Result<(), BrowserError>;

    /// Rendered HTML of the current page.
    fn content(&mut self) -> Result<String, BrowserError>;

    fn current_url(&self) -> String;
}

#[derive(Debug)]
pub enum BrowserError {
    /// The page loaded but the element we were looking for is not on it.
    ElementNotFound { target: String, cause: String },
    /// Launch, navigation or timeout failure.
    Navigation(anyhow::Error),
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::ElementNotFound { target, cause } => {
                write!(f, "element not found: {target} ({cause})")
            }
            BrowserError::Navigation(e) => write!(f, "navigation failed: {e:#}"),
        }
    }
}

impl std::error::Error for BrowserError {}
