//! HTML report renderer.

use serde_json::Value;
use std::fmt::Write;

use crate::core::report::ValidationReport;

const STYLE: &str = "\
:root{--danger:#dc2626;--warning:#d97706;--success:#059669;--info:#2563eb;\
--bg:#f8f9fa;--card:#ffffff;--text:#1f2937;--muted:#6b7280;--border:#e5e7eb}\
*{box-sizing:border-box;margin:0;padding:0}\
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;\
background:var(--bg);color:var(--text);line-height:1.6;padding:20px}\
.container{max-width:1100px;margin:0 auto}\
.header{background:var(--card);padding:24px;border-radius:12px;margin-bottom:16px}\
.badge{display:inline-block;padding:6px 14px;border-radius:20px;font-weight:600}\
.badge.pass{background:#f0fdf4;color:var(--success)}\
.badge.fail{background:#fff5f5;color:var(--danger)}\
.cards{display:grid;grid-template-columns:repeat(auto-fit,minmax(150px,1fr));\
gap:12px;margin-bottom:16px}\
.card{background:var(--card);padding:16px;border-radius:10px}\
.card .label{font-size:.8rem;color:var(--muted);text-transform:uppercase}\
.card .value{font-size:1.6rem;font-weight:700}\
.card.critical .value,.card.error .value{color:var(--danger)}\
.card.warning .value{color:var(--warning)}\
.card.info .value{color:var(--info)}\
.section{background:var(--card);border-radius:12px;padding:20px;margin-bottom:16px}\
details{margin:16px 0 10px}\
details summary{font-weight:600;padding:10px 14px;background:var(--bg);\
border-radius:8px;cursor:pointer}\
.violation{border-left:4px solid;padding:12px 16px;margin-bottom:10px;\
border-radius:0 8px 8px 0;background:var(--bg)}\
.violation.critical,.violation.error{border-color:var(--danger);background:#fff5f5}\
.violation.warning{border-color:var(--warning);background:#fffbeb}\
.violation.info{border-color:var(--info);background:#eff6ff}\
.code{font-family:monospace;font-weight:600}\
.suggestion{color:var(--muted);font-size:.9rem}\
.context{font-family:monospace;font-size:.8rem;background:rgba(0,0,0,.05);\
padding:8px;border-radius:6px;overflow-x:auto;margin-top:6px}\
table{width:100%;border-collapse:collapse}\
td,th{padding:8px 12px;text-align:left;border-bottom:1px solid var(--border)}";

/// Renders the report as a standalone HTML document with a status banner,
/// summary cards per severity, and one group per check.
pub fn render_html(report: &ValidationReport) -> String {
    let summary = report.summary();
    let (badge_class, badge_text) = if report.is_valid() {
        ("pass", "✓ Validation Passed")
    } else {
        ("fail", "✗ Validation Failed")
    };

    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang='en'>\n<head>\n\
         <title>StatGuard Validation Report</title>\n<meta charset='UTF-8'>\n\
         <style>{STYLE}</style>\n</head>\n<body>\n<div class='container'>\n\
         <div class='header'><h1>🛡️ StatGuard Validation Report</h1>\
         <p><span class='badge {badge_class}'>{badge_text}</span></p></div>\n"
    );

    let _ = write!(
        out,
        "<div class='cards'>\
         <div class='card critical'><div class='label'>Critical</div><div class='value'>{}</div></div>\
         <div class='card error'><div class='label'>Errors</div><div class='value'>{}</div></div>\
         <div class='card warning'><div class='label'>Warnings</div><div class='value'>{}</div></div>\
         <div class='card info'><div class='label'>Info</div><div class='value'>{}</div></div>\
         <div class='card'><div class='label'>Checks Run</div><div class='value'>{}</div></div>\
         <div class='card'><div class='label'>Success Rate</div><div class='value'>{:.0}%</div></div>\
         </div>\n",
        summary.critical_count,
        summary.error_count,
        summary.warning_count,
        summary.info_count,
        summary.total_checks,
        summary.success_rate * 100.0,
    );

    let _ = write!(out, "<div class='section'><h2>📋 Violations</h2>\n");
    if report.violations().is_empty() {
        let _ = write!(
            out,
            "<p>🎉 No violations detected! Your data passed all checks.</p>\n"
        );
    } else {
        for (check, violations) in report.by_check() {
            if violations.is_empty() {
                continue;
            }
            let _ = write!(
                out,
                "<details open>\n<summary>{} ({})</summary>\n",
                escape(check),
                violations.len()
            );
            for v in violations {
                let severity_class = v.severity().label().to_ascii_lowercase();
                let _ = write!(
                    out,
                    "<div class='violation {severity_class}'>\
                     <div><span class='code'>{}</span> {}</div>\
                     <div>{}</div>\
                     <div class='suggestion'>→ {}</div>",
                    v.code(),
                    v.severity().label(),
                    escape(v.message()),
                    escape(v.suggestion()),
                );
                if !v.context().is_empty() {
                    let context = Value::Object(v.context().clone()).to_string();
                    let _ = write!(out, "<div class='context'>{}</div>", escape(&context));
                }
                let _ = write!(out, "</div>\n");
            }
            let _ = write!(out, "</details>\n");
        }
    }
    let _ = write!(out, "</div>\n");

    let metadata = report.metadata();
    let _ = write!(
        out,
        "<div class='section'><h2>ℹ️ Metadata</h2>\n<table>\
         <tr><th>Property</th><th>Value</th></tr>\
         <tr><td>Rows</td><td>{}</td></tr>\
         <tr><td>Columns</td><td>{}</td></tr>\
         <tr><td>Target Column</td><td>{}</td></tr>\
         <tr><td>Group Column</td><td>{}</td></tr>\
         <tr><td>Unit Column</td><td>{}</td></tr>\
         <tr><td>Policy</td><td>{}</td></tr>\
         </table></div>\n</div>\n</body>\n</html>\n",
        metadata.rows,
        metadata.columns,
        escape(&metadata.target_col),
        escape(metadata.group_col.as_deref().unwrap_or("-")),
        escape(metadata.unit_col.as_deref().unwrap_or("-")),
        escape(&metadata.policy),
    );

    out
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::ReportMetadata;
    use crate::core::severity::Severity;
    use crate::core::violation::{codes, Violation};

    #[test]
    fn test_html_document_structure() {
        let mut report = ValidationReport::new(ReportMetadata {
            rows: 25,
            columns: 2,
            target_col: "metric".into(),
            group_col: None,
            unit_col: None,
            policy: "default".into(),
        });
        report.add_violation(
            "Outlier Detection",
            Violation::builder(codes::EXTREME_OUTLIERS, Severity::Warning)
                .message("Group 'all' has 12.0% outliers <above threshold>")
                .suggestion("Investigate outliers")
                .build(),
        );
        report.mark_check_complete("Outlier Detection", false);
        report.finalize();

        let html = render_html(&report);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("✗ Validation Failed"));
        assert!(html.contains("class='violation warning'"));
        assert!(html.contains("<summary>Outlier Detection (1)</summary>"));
        // angle brackets in messages must be escaped
        assert!(html.contains("&lt;above threshold&gt;"));
        assert!(html.contains("<td>metric</td>"));
    }

    #[test]
    fn test_html_clean_report_shows_empty_state() {
        let mut report = ValidationReport::new(ReportMetadata {
            rows: 100,
            columns: 1,
            target_col: "metric".into(),
            group_col: None,
            unit_col: None,
            policy: "default".into(),
        });
        report.mark_check_complete("Minimum Sample Size", true);
        report.finalize();

        let html = render_html(&report);
        assert!(html.contains("✓ Validation Passed"));
        assert!(html.contains("No violations detected"));
    }
}
