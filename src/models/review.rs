//! Review Report Models
//!
//! Rows of the three report tiers (repository, file, line) plus per-file
//! outcomes, and the JSON artifact that holds them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use review_cascade_core::{EvaluationDetail, EvaluationReport, Severity};

/// Review category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewCategory {
    CodeStyle,
    DryModularity,
    Security,
}

impl ReviewCategory {
    /// All categories in report order.
    pub const ALL: [ReviewCategory; 3] = [
        ReviewCategory::CodeStyle,
        ReviewCategory::DryModularity,
        ReviewCategory::Security,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReviewCategory::CodeStyle => "Code Style and Consistency",
            ReviewCategory::DryModularity => "DRY and Modularity",
            ReviewCategory::Security => "Security Compliance",
        }
    }
}

impl std::fmt::Display for ReviewCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// File-tier row: one per file per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileLevelRow {
    pub filename: String,
    pub category: ReviewCategory,
    pub violations: usize,
    pub score: Option<f64>,
    pub issue_summary: String,
    pub refactor_summary: String,
}

impl FileLevelRow {
    pub fn from_report(filename: &str, category: ReviewCategory, report: &EvaluationReport) -> Self {
        Self {
            filename: filename.to_string(),
            category,
            violations: report.violation_count,
            score: report.evaluation_score,
            issue_summary: report.issue_summary.clone(),
            refactor_summary: report.refactor_summary.clone(),
        }
    }
}

/// Line-tier row: one per evaluation detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineLevelRow {
    pub filename: String,
    pub category: ReviewCategory,
    pub start_line_number: u32,
    pub end_line_number: u32,
    pub severity: Severity,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_error: Option<String>,
    pub issue_summary: String,
    pub original_code_script: String,
    pub refactored_script: Option<String>,
}

impl LineLevelRow {
    pub fn from_detail(filename: &str, category: ReviewCategory, detail: &EvaluationDetail) -> Self {
        Self {
            filename: filename.to_string(),
            category,
            start_line_number: detail.start_line,
            end_line_number: detail.end_line,
            severity: detail.severity,
            score: detail.score,
            score_error: detail.score_error.clone(),
            issue_summary: detail.issue_summary.clone(),
            original_code_script: detail.original_snippet.clone(),
            refactored_script: detail.refactored_snippet.clone(),
        }
    }
}

/// How one category went for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Succeeded,
    Failed { reason: String },
}

impl FileOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRow {
    pub filename: String,
    pub category: ReviewCategory,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Repository-tier row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRow {
    #[serde(rename = "Review Category")]
    pub review_category: String,
    #[serde(rename = "Vulnerabilities Flagged")]
    pub vulnerabilities_flagged: usize,
    #[serde(rename = "AI Review Score")]
    pub ai_review_score: Option<f64>,
    #[serde(rename = "AI Reviewer Comments")]
    pub ai_reviewer_comments: String,
    #[serde(rename = "AI Suggested Fixes")]
    pub ai_suggested_fixes: String,
}

/// Aggregate of one category across the files it covered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: ReviewCategory,
    /// Files that produced a row for this category
    pub files: usize,
    pub violations: usize,
    /// Mean of the defined file scores
    pub score: Option<f64>,
    pub issue_summary: String,
    pub refactor_summary: String,
}

/// Repository-wide aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub categories: Vec<CategorySummary>,
    pub violations: usize,
    /// Mean of the defined category scores, each category weighted equally
    pub score: Option<f64>,
    pub issue_summary: String,
    pub refactor_summary: String,
}

impl RepositorySummary {
    /// Repository-tier table: one row per category plus an "Overall" row.
    pub fn rows(&self) -> Vec<RepositoryRow> {
        let mut rows: Vec<RepositoryRow> = self
            .categories
            .iter()
            .map(|c| RepositoryRow {
                review_category: c.category.label().to_string(),
                vulnerabilities_flagged: c.violations,
                ai_review_score: c.score,
                ai_reviewer_comments: c.issue_summary.clone(),
                ai_suggested_fixes: c.refactor_summary.clone(),
            })
            .collect();
        rows.push(RepositoryRow {
            review_category: "Overall".to_string(),
            vulnerabilities_flagged: self.violations,
            ai_review_score: self.score,
            ai_reviewer_comments: self.issue_summary.clone(),
            ai_suggested_fixes: self.refactor_summary.clone(),
        });
        rows
    }
}

/// The JSON report artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub repository: Vec<RepositoryRow>,
    pub files: Vec<FileLevelRow>,
    pub lines: Vec<LineLevelRow>,
    pub outcomes: Vec<OutcomeRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_row_column_names() {
        let row = RepositoryRow {
            review_category: "Overall".to_string(),
            vulnerabilities_flagged: 3,
            ai_review_score: Some(5.5),
            ai_reviewer_comments: "c".to_string(),
            ai_suggested_fixes: "f".to_string(),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["Vulnerabilities Flagged"], 3);
        assert_eq!(value["AI Review Score"], 5.5);
    }

    #[test]
    fn test_outcome_row_is_flat() {
        let row = OutcomeRow {
            filename: "a.py".to_string(),
            category: ReviewCategory::Security,
            outcome: FileOutcome::Failed {
                reason: "bandit missing".to_string(),
            },
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["reason"], "bandit missing");
        assert_eq!(value["category"], "security");
    }

    #[test]
    fn test_summary_rows_end_with_overall() {
        let summary = RepositorySummary {
            categories: vec![CategorySummary {
                category: ReviewCategory::CodeStyle,
                files: 1,
                violations: 2,
                score: Some(4.0),
                issue_summary: String::new(),
                refactor_summary: String::new(),
            }],
            violations: 2,
            score: Some(4.0),
            issue_summary: String::new(),
            refactor_summary: String::new(),
        };
        let rows = summary.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].review_category, "Code Style and Consistency");
        assert_eq!(rows[1].review_category, "Overall");
    }
}
