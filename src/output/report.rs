//! Failed-URL file and JSON run report.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::engine::RunSummary;
use crate::model::{Endpoint, FailedUrls};

/// JSON document written by [`write_report`].
#[derive(Debug, Serialize)]
pub struct ProbeReport<'a> {
    pub summary: &'a RunSummary,
    pub endpoints: &'a [Endpoint],
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Write the failed URLs, sorted, one per line.
pub fn write_failed_urls(path: &Path, failed: &FailedUrls) -> io::Result<()> {
    ensure_parent(path)?;

    let mut content = failed.sorted().join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(path, content)?;

    tracing::info!(path = %path.display(), count = failed.len(), "Failed URLs written");
    Ok(())
}

/// Write endpoints and run summary as pretty-printed JSON.
pub fn write_report(path: &Path, endpoints: &[Endpoint], summary: &RunSummary) -> io::Result<()> {
    ensure_parent(path)?;

    let report = ProbeReport { summary, endpoints };
    let json = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
    fs::write(path, json)?;

    tracing::info!(path = %path.display(), endpoints = endpoints.len(), "Run report written");
    Ok(())
}
