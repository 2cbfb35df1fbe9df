//! One end-to-end run: sign in, scrape, classify, render, deliver.

use anyhow::Result;
use chrono::Local;
use tracing::{info, warn};

use crate::artifacts::DebugDumps;
use crate::classify::{ClassSummary, Report};
use crate::config::Config;
use crate::delivery::{Delivered, FileMailer, Mailer, OutgoingEmail, SmtpMailer};
use crate::error::PortalError;
use crate::navigator::Navigator;
use crate::output::write_report_json;
use crate::parser::{parse_class_details, parse_grades_overview};
use crate::report;
use crate::session::{Browser, ChromeBrowser, login};

/// Signs in and scrapes every class into a [`Report`].
///
/// Detail pages are loaded only for classes the portal has assessed. Any
/// error aborts the run; there is no partial report.
#[tracing::instrument(skip_all, fields(student = %config.student_name))]
pub fn collect_report<B: Browser>(
    browser: &mut B,
    config: &Config,
    dumps: &DebugDumps,
) -> Result<Report, PortalError> {
    login(browser, &config.portal)?;

    let mut navigator = Navigator::new(browser, dumps);
    let overview = parse_grades_overview(&navigator.grades_overview()?)?;
    info!(
        classes = overview.classes.len(),
        missing_work = overview.missing_work.len(),
        "Grades overview parsed"
    );

    let mut classes = Vec::with_capacity(overview.classes.len());
    for class in &overview.classes {
        if !class.status.is_assessed() {
            info!(class = %class.name, "Not assessed yet, skipping details");
            classes.push(ClassSummary::classify(class, None));
            continue;
        }
        let html = navigator.class_details(class)?;
        let details = parse_class_details(&html, &class.name);
        let summary = ClassSummary::classify(class, Some(&details));
        info!(
            class = %class.name,
            tier = %summary.overall_status(),
            assignments = summary.assignments().len(),
            standards = summary.standards().len(),
            "Class classified"
        );
        classes.push(summary);
    }

    let report = Report::new(
        &config.student_name,
        Local::now(),
        classes,
        overview.missing_work,
    );
    let totals = report.totals();
    info!(
        classes = report.classes().len(),
        missing = totals.missing,
        below_meeting = totals.below_meeting,
        critical = totals.critical,
        "Report built"
    );
    Ok(report)
}

/// Runs the whole job against the live portal.
///
/// The browser is closed before delivery starts.
pub fn run(config: &Config) -> Result<Delivered> {
    let dumps = DebugDumps::new(&config.log_dir, config.save_debug_html);

    let report = {
        let mut browser = ChromeBrowser::launch(&config.browser)?;
        collect_report(&mut browser, config, &dumps)?
    };

    let email = OutgoingEmail {
        to: config.email.recipient.clone(),
        subject: report::subject(&report),
        body: report::render_text(&report),
    };

    if config.email.test_mode {
        if let Err(e) = write_report_json(&config.log_dir, &report) {
            warn!(error = %e, "Could not save report JSON");
        }
        Ok(FileMailer::new(&config.log_dir).deliver(&email)?)
    } else {
        Ok(SmtpMailer::new(&config.email).deliver(&email)?)
    }
}
