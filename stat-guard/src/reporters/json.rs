//! JSON report renderer.

use chrono::Utc;
use serde_json::Value;

use crate::core::report::ValidationReport;
use crate::error::Result;
use crate::reporters::REPORT_VERSION;

/// Renders the full report as a JSON document with a generation timestamp
/// and schema version.
pub fn render_json(report: &ValidationReport, pretty: bool) -> Result<String> {
    let mut value = report.to_json_value();
    if let Value::Object(map) = &mut value {
        map.insert("generated_at".into(), Value::String(Utc::now().to_rfc3339()));
        map.insert("version".into(), Value::String(REPORT_VERSION.into()));
    }
    let rendered = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(rendered)
}
