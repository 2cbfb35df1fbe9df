//! CLI entry point: one scrape-and-email run per invocation.
//!
//! All settings come from the environment (a `.env` file is loaded first).

use clap::Parser;
use grade_digest::{config, config::Config, delivery::Delivered, error::PortalError, logging, pipeline};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "grade_digest", version)]
#[command(
    about = "Scrape TeacherEase standards-based grades and email a digest",
    long_about = None
)]
struct Cli {}

fn main() -> ExitCode {
    let _cli = Cli::parse();
    dotenvy::dotenv().ok();

    let log_dir = config::log_dir_from(|key| std::env::var(key).ok());
    let _guard = match logging::init(&log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging in {}: {e:#}", log_dir.display());
            return ExitCode::FAILURE;
        }
    };

    match run() {
        Ok(Delivered::Sent { to }) => {
            info!(to = %to, "Grade digest emailed");
            ExitCode::SUCCESS
        }
        Ok(Delivered::Saved { path }) => {
            info!(path = %path.display(), "Grade digest saved");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let kind = e
                .downcast_ref::<PortalError>()
                .map_or("configuration_error", PortalError::kind);
            error!(kind, error = %format!("{e:#}"), "Run failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<Delivered> {
    let config = Config::from_env()?;
    info!(
        student = %config.student_name,
        test_mode = config.email.test_mode,
        headless = config.browser.headless,
        "Configuration loaded"
    );
    pipeline::run(&config)
}
