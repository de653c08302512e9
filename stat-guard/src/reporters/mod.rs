//! Report renderers: JSON, Markdown, and HTML views of a finalized
//! validation report.

mod html;
mod json;
mod markdown;

pub use html::render_html;
pub use json::render_json;
pub use markdown::render_markdown;

use std::path::Path;
use std::str::FromStr;

use crate::core::report::ValidationReport;
use crate::error::{GuardError, Result};

/// Schema version stamped into JSON reports.
pub const REPORT_VERSION: &str = "1.0.0";

/// An output format for a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Markdown,
    Html,
}

impl ReportFormat {
    /// Picks the format from a file path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match ext.to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "md" | "markdown" => Ok(ReportFormat::Markdown),
            "html" | "htm" => Ok(ReportFormat::Html),
            other => Err(GuardError::UnknownFormat(other.to_string())),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "html" => Ok(ReportFormat::Html),
            other => Err(GuardError::UnknownFormat(other.to_string())),
        }
    }
}

/// Renders the report in the requested format.
pub fn render(report: &ValidationReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => render_json(report, true),
        ReportFormat::Markdown => Ok(render_markdown(report)),
        ReportFormat::Html => Ok(render_html(report)),
    }
}

/// Renders the report in the format implied by the path's extension and
/// writes it there.
pub fn save(report: &ValidationReport, path: &Path) -> Result<()> {
    let format = ReportFormat::from_path(path)?;
    let rendered = render(report, format)?;
    std::fs::write(path, rendered)?;
    Ok(())
}
