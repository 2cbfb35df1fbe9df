use anyhow::anyhow;
use headless_chrome::{Browser as Chrome, LaunchOptions, Tab};
use std::sync::Arc;
use tracing::{debug, info};

use super::browser::{Browser, BrowserError};
use crate::config::BrowserOptions;
use crate::error::PortalError;

/// Headless Chrome session with a single tab.
///
/// Owns the Chrome process: dropping the value shuts the browser down, so a
/// run releases it on every exit path.
pub struct ChromeBrowser {
    _chrome: Chrome,
    tab: Arc<Tab>,
}

impl ChromeBrowser {
    pub fn launch(options: &BrowserOptions) -> Result<Self, PortalError> {
        info!(headless = options.headless, "Starting browser");

        let launch = LaunchOptions::default_builder()
            .headless(options.headless)
            .idle_browser_timeout(options.page_timeout * 2)
            .build()
            .map_err(|e| PortalError::Session(anyhow!("invalid launch options: {e}")))?;
        let chrome = Chrome::new(launch).map_err(PortalError::Session)?;
        let tab = chrome.new_tab().map_err(PortalError::Session)?;
        tab.set_default_timeout(options.page_timeout);

        info!("Browser started");
        Ok(Self {
            _chrome: chrome,
            tab,
        })
    }
}

impl Browser for ChromeBrowser {
    fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        debug!(url, "Navigating");
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map(|_| ())
            .map_err(BrowserError::Navigation)
    }

    fn click_text(&mut self, tag: &str, text: &str) -> Result<(), BrowserError> {
        let xpath = format!("//{tag}[contains(normalize-space(.), '{text}')]");
        let element = self
            .tab
            .wait_for_xpath(&xpath)
            .map_err(|e| BrowserError::ElementNotFound {
                target: xpath.clone(),
                cause: e.to_string(),
            })?;
        element.click().map_err(BrowserError::Navigation)?;
        self.tab
            .wait_until_navigated()
            .map(|_| ())
            .map_err(BrowserError::Navigation)
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<(), BrowserError> {
        let element = self
            .tab
            .wait_for_element(selector)
            .map_err(|e| BrowserError::ElementNotFound {
                target: selector.to_string(),
                cause: e.to_string(),
            })?;
        element
            .type_into(value)
            .map(|_| ())
            .map_err(BrowserError::Navigation)
    }

    fn content(&mut self) -> Result<String, BrowserError> {
        self.tab.get_content().map_err(BrowserError::Navigation)
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }
}

impl Drop for ChromeBrowser {
    fn drop(&mut self) {
        info!("Closing browser");
    }
}
