//! Markdown report renderer.

use chrono::Utc;
use serde_json::Value;
use std::fmt::Write;

use crate::core::report::ValidationReport;

/// Renders the report as a Markdown document: status heading, summary
/// bullets, per-check violation subsections, and a metadata list.
pub fn render_markdown(report: &ValidationReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# StatGuard Validation Report\n");
    let _ = writeln!(
        out,
        "*Generated: {}*\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    );

    let status = if report.is_valid() {
        "✅ PASSED"
    } else {
        "❌ FAILED"
    };
    let _ = writeln!(out, "## Validation Status: {status}\n");

    let summary = report.summary();
    let _ = writeln!(out, "## Summary\n");
    let _ = writeln!(out, "- **Total Checks:** {}", summary.total_checks);
    let _ = writeln!(out, "- **Passed:** {}", summary.passed_checks);
    let _ = writeln!(out, "- **Failed:** {}", summary.failed_checks);
    let _ = writeln!(
        out,
        "- **Success Rate:** {:.1}%\n",
        summary.success_rate * 100.0
    );

    let _ = writeln!(out, "### Issues by Severity\n");
    let _ = writeln!(out, "- 🔴 Critical: {}", summary.critical_count);
    let _ = writeln!(out, "- ❌ Errors: {}", summary.error_count);
    let _ = writeln!(out, "- ⚠️ Warnings: {}", summary.warning_count);
    let _ = writeln!(out, "- ℹ️ Info: {}\n", summary.info_count);

    let _ = writeln!(out, "## Violations\n");
    if report.violations().is_empty() {
        let _ = writeln!(out, "✅ No violations detected!\n");
    } else {
        for (check, violations) in report.by_check() {
            if violations.is_empty() {
                continue;
            }
            let _ = writeln!(out, "### {check}\n");
            for v in violations {
                let _ = writeln!(out, "#### {} {}\n", v.severity().icon(), v.code());
                let _ = writeln!(out, "**Severity:** {}\n", v.severity().label());
                let _ = writeln!(out, "**Message:** {}\n", v.message());
                let _ = writeln!(out, "**Suggestion:** {}\n", v.suggestion());
                if !v.context().is_empty() {
                    let context = serde_json::to_string_pretty(&Value::Object(v.context().clone()))
                        .unwrap_or_default();
                    let _ = writeln!(out, "**Context:**\n```json\n{context}\n```\n");
                }
            }
        }
    }

    let metadata = report.metadata();
    let _ = writeln!(out, "## Metadata\n");
    let _ = writeln!(out, "- **Rows:** {}", metadata.rows);
    let _ = writeln!(out, "- **Columns:** {}", metadata.columns);
    let _ = writeln!(out, "- **Target Column:** {}", metadata.target_col);
    let _ = writeln!(
        out,
        "- **Group Column:** {}",
        metadata.group_col.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(
        out,
        "- **Unit Column:** {}",
        metadata.unit_col.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(out, "- **Policy:** {}", metadata.policy);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::ReportMetadata;
    use crate::core::severity::Severity;
    use crate::core::violation::{codes, Violation};

    #[test]
    fn test_markdown_sections() {
        let mut report = ValidationReport::new(ReportMetadata {
            rows: 10,
            columns: 2,
            target_col: "metric".into(),
            group_col: Some("arm".into()),
            unit_col: None,
            policy: "strict".into(),
        });
        report.add_violation(
            "Minimum Sample Size",
            Violation::builder(codes::SAMPLE_TOO_SMALL, Severity::Error)
                .message("Total sample size (10) below minimum (30)")
                .suggestion("Collect more data")
                .context("actual", 10)
                .build(),
        );
        report.mark_check_complete("Minimum Sample Size", false);
        report.finalize();

        let md = render_markdown(&report);
        assert!(md.contains("## Validation Status: ❌ FAILED"));
        assert!(md.contains("### Minimum Sample Size"));
        assert!(md.contains("#### ❌ SG101"));
        assert!(md.contains("**Severity:** ERROR"));
        assert!(md.contains("```json"));
        assert!(md.contains("- **Group Column:** arm"));
        assert!(md.contains("- **Unit Column:** N/A"));
    }

    #[test]
    fn test_markdown_clean_report() {
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

        let md = render_markdown(&report);
        assert!(md.contains("## Validation Status: ✅ PASSED"));
        assert!(md.contains("✅ No violations detected!"));
    }
}
