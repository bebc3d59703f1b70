//! Report Materializer
//!
//! Writes the three-tier review report as one pretty-printed JSON file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::models::review::{RepositorySummary, ReviewReport};
use crate::services::batch::ResultCollector;
use crate::utils::error::AppResult;
use crate::utils::paths::{ensure_dir, report_file_name};

/// Assemble the report artifact from a finished batch.
pub fn build_report(
    summary: &RepositorySummary,
    collector: &ResultCollector,
    generated_at: DateTime<Utc>,
) -> ReviewReport {
    ReviewReport {
        run_id: uuid::Uuid::new_v4().to_string(),
        generated_at,
        repository: summary.rows(),
        files: collector.file_rows().to_vec(),
        lines: collector.line_rows().to_vec(),
        outcomes: collector.outcomes().to_vec(),
    }
}

/// Write `report` into `output_dir`, returning the file path.
pub fn write_report(report: &ReviewReport, output_dir: &Path) -> AppResult<PathBuf> {
    ensure_dir(output_dir)?;
    let timestamp = report.generated_at.format("%Y%m%d_%H%M%S").to_string();
    let path = output_dir.join(report_file_name(&timestamp, &report.run_id));
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)?;
    tracing::info!(path = %path.display(), "Report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::review::ReviewCategory;
    use chrono::TimeZone;
    use review_cascade_core::EvaluationReport;
    use tempfile::TempDir;

    #[test]
    fn test_write_report_round_trip() {
        let temp = TempDir::new().unwrap();
        let mut collector = ResultCollector::new();
        collector.record_success(
            "a.py",
            ReviewCategory::DryModularity,
            &EvaluationReport::from_details("i", "r", vec![]),
        );
        collector.record_failure("b.py", ReviewCategory::Security, "bandit not installed");
        let summary = RepositorySummary {
            categories: vec![],
            violations: 0,
            score: None,
            issue_summary: "none".to_string(),
            refactor_summary: "none".to_string(),
        };
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 5).unwrap();

        let report = build_report(&summary, &collector, at);
        let path = write_report(&report, &temp.path().join("out")).unwrap();

        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("code_review_report_20260301_093005_{}.json", &report.run_id[..8])
        );
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["files"].as_array().unwrap().len(), 1);
        assert_eq!(written["outcomes"][1]["status"], "failed");
        assert_eq!(written["repository"][0]["Review Category"], "Overall");
    }

    #[test]
    fn test_runs_in_the_same_second_keep_separate_files() {
        let temp = TempDir::new().unwrap();
        let collector = ResultCollector::new();
        let summary = RepositorySummary {
            categories: vec![],
            violations: 0,
            score: None,
            issue_summary: String::new(),
            refactor_summary: String::new(),
        };
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 5).unwrap();

        let first = write_report(&build_report(&summary, &collector, at), temp.path()).unwrap();
        let second = write_report(&build_report(&summary, &collector, at), temp.path()).unwrap();

        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 2);
    }
}
