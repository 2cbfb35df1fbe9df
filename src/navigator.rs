//! Walks from the signed-in landing page to the grade pages.

use tracing::{debug, error, info};
use url::Url;

use crate::artifacts::DebugDumps;
use crate::error::PortalError;
use crate::parser::text::slug;
use crate::parser::{ClassOverview, has_class_payload, has_standards};
use crate::session::{Browser, BrowserError};

pub const GRADES_PATH: &str = "/App/Parents/StandardGrade/GradeViewAllWithProgress";
pub const DETAILS_PATH: &str = "/common/StudentProgressStandardsDetails.aspx";

const OVERVIEW_PAGE: &str = "grades overview";

/// Grades overview URL for the portal the browser is currently on.
///
/// The path is cut at `/parents`, else at `/App`; the host is never searched.
pub fn grades_url(current: &str) -> Result<String, PortalError> {
    let here = current_page(current)?;
    let path = here.path();
    let prefix = match path.find("/parents") {
        Some(i) => &path[..i],
        None => path.find("/App").map_or(path, |i| &path[..i]),
    };
    Ok(format!(
        "{}{}{GRADES_PATH}",
        here.origin().ascii_serialization(),
        prefix.trim_end_matches('/')
    ))
}

/// Standards detail URL for one class, on the current page's origin.
pub fn details_url(current: &str, class_id: &str, cgp_id: &str) -> Result<String, PortalError> {
    let origin = current_page(current)?.origin().ascii_serialization();
    let url = Url::parse_with_params(
        &format!("{origin}{DETAILS_PATH}"),
        &[("ClassID", class_id), ("CGPID", cgp_id)],
    )
    .map_err(|e| PortalError::parse("class details URL", e))?;
    Ok(url.into())
}

fn current_page(current: &str) -> Result<Url, PortalError> {
    Url::parse(current).map_err(|e| PortalError::StructuralChange {
        page: "landing page".into(),
        expected: format!("an absolute URL, got '{current}' ({e})"),
    })
}

pub struct Navigator<'a, B: Browser> {
    browser: &'a mut B,
    dumps: &'a DebugDumps,
}

impl<'a, B: Browser> Navigator<'a, B> {
    pub fn new(browser: &'a mut B, dumps: &'a DebugDumps) -> Self {
        Self { browser, dumps }
    }

    /// Loads the grades overview and returns its HTML.
    ///
    /// # Errors
    ///
    /// `StructuralChange` when the page has no embedded class list.
    #[tracing::instrument(skip_all)]
    pub fn grades_overview(&mut self) -> Result<String, PortalError> {
        let url = grades_url(&self.browser.current_url())?;
        info!(url = %url, "Navigating to grades overview");
        let html = self.load(&url)?;

        if !has_class_payload(&html) {
            return Err(self.structural(OVERVIEW_PAGE, "embedded class data", &html));
        }
        self.dumps.save_page("grades_page.html", &html);
        Ok(html)
    }

    /// Loads one class's standards detail page and returns its HTML.
    ///
    /// # Errors
    ///
    /// `StructuralChange` when the class has no detail-page IDs or the page
    /// has no standards list.
    #[tracing::instrument(skip_all, fields(class = %class.name))]
    pub fn class_details(&mut self, class: &ClassOverview) -> Result<String, PortalError> {
        let page = format!("{} details", class.name);
        let (Some(class_id), Some(cgp_id)) = (&class.class_id, &class.cgp_id) else {
            error!("Class is missing ClassID or CGPID");
            return Err(PortalError::StructuralChange {
                page: OVERVIEW_PAGE.into(),
                expected: format!("ClassID and CGPID for {}", class.name),
            });
        };

        let url = details_url(&self.browser.current_url(), class_id, cgp_id)?;
        info!(url = %url, class_id = %class_id, cgp_id = %cgp_id, "Navigating to class details");
        let html = self.load(&url)?;

        if !has_standards(&html) {
            return Err(self.structural(&page, "a root standards list", &html));
        }
        self.dumps
            .save_page(&format!("{}_details.html", slug(&class.name)), &html);
        Ok(html)
    }

    fn load(&mut self, url: &str) -> Result<String, PortalError> {
        self.browser.goto(url).map_err(session_error)?;
        let html = self.browser.content().map_err(session_error)?;
        debug!(url, bytes = html.len(), "Page loaded");
        Ok(html)
    }

    /// Records the offending page before handing back the error.
    fn structural(&self, page: &str, expected: &str, html: &str) -> PortalError {
        let dump = self.dumps.save_failure(page, html);
        error!(
            page,
            expected,
            url = %self.browser.current_url(),
            dump = ?dump,
            "Portal markup no longer matches"
        );
        debug!(page, html = %html, "Offending page HTML");
        PortalError::StructuralChange {
            page: page.to_string(),
            expected: expected.to_string(),
        }
    }
}

fn session_error(e: BrowserError) -> PortalError {
    match e {
        BrowserError::Navigation(e) => PortalError::Session(e),
        not_found @ BrowserError::ElementNotFound { .. } => {
            PortalError::Session(anyhow::anyhow!("{not_found}"))
        }
    }
}
