//! JSON persistence for the structured report.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::classify::Report;

/// Writes the report as pretty-printed JSON to `report_<timestamp>.json` in `dir`.
pub fn write_report_json(dir: &Path, report: &Report) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("report_{stamp}.json"));
    let json = serde_json::to_string_pretty(report)?;
    debug!(bytes = json.len(), "Report serialized");

    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "Report JSON saved");
    Ok(path)
}
