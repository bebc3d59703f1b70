//! Code Style Checks
//!
//! The three analysis nodes of the code-style graph:
//! - `PythonCheck`: pylint findings, scored by one batched generation call
//! - `SqlPythonCheck`: generation-only style review for SQL-bearing files
//! - `InlineCommentsCheck`: comment and docstring review

use std::sync::Arc;

use review_cascade_core::{
    parse_payload, recover_or_default, Issue, SourceFile, ToolReport, MAX_SCORE,
};
use review_cascade_llm::TextGenerationClient;
use review_cascade_scanners::StaticScanner;

use super::prompts;
use super::wire::{
    validate_records, InlineIssue, InlineIssueWire, IssueWire, ReportListWire, ScoreListWire,
    StyleReportWire, INLINE_COMMENT_SCORE,
};
use crate::utils::error::AppResult;

// ============================================================================
// Python lint check
// ============================================================================

pub struct PythonCheck {
    client: Arc<TextGenerationClient>,
    pylint: Arc<dyn StaticScanner>,
}

impl PythonCheck {
    pub fn new(client: Arc<TextGenerationClient>, pylint: Arc<dyn StaticScanner>) -> Self {
        Self { client, pylint }
    }

    pub async fn run(&self, source: &SourceFile) -> AppResult<ToolReport> {
        let scan = self.pylint.scan(source).await?;
        tracing::info!(
            file = %source.name,
            findings = scan.findings.len(),
            base_score = ?scan.base_score,
            "pylint finished"
        );
        if scan.findings.is_empty() {
            return Ok(ToolReport::new(Vec::new(), 0, scan.base_score));
        }

        let prompt = prompts::lint_scoring(&source.numbered(), &scan.findings);
        let reply = self.client.generate(&prompt).await?;
        let scores: ScoreListWire = recover_or_default(&reply, "lint_scoring");
        if scores.score.len() != scan.findings.len() {
            tracing::warn!(
                file = %source.name,
                expected = scan.findings.len(),
                received = scores.score.len(),
                "Score count mismatch; missing scores are left unscored"
            );
        }

        let issues: Vec<Issue> = scan
            .findings
            .iter()
            .enumerate()
            .map(|(idx, finding)| {
                Issue::new(
                    finding.start_line,
                    finding.end_line,
                    finding.severity,
                    scores.score_at(idx),
                    finding.message.clone(),
                )
            })
            .collect();
        Ok(ToolReport::from_issues(issues, scan.base_score))
    }
}

// ============================================================================
// SQL / Python+SQL style check
// ============================================================================

pub struct SqlPythonCheck {
    client: Arc<TextGenerationClient>,
}

impl SqlPythonCheck {
    pub fn new(client: Arc<TextGenerationClient>) -> Self {
        Self { client }
    }

    /// A reply that does not parse yields an empty report.
    pub async fn run(&self, source: &SourceFile) -> AppResult<ToolReport> {
        let prompt = prompts::sql_python_style(&source.numbered());
        let reply = self.client.generate(&prompt).await?;

        let wire: StyleReportWire = match parse_payload(&reply) {
            Ok(wire) => wire,
            Err(e) => {
                tracing::warn!(file = %source.name, error = %e, "Malformed SQL style response");
                return Ok(ToolReport::empty());
            }
        };

        let issues = validate_records::<IssueWire, Issue>(wire.issues, "sql_python_style");
        let violation_count = wire
            .violations
            .filter(|v| *v >= 0.0)
            .map(|v| v.round() as usize)
            .unwrap_or(issues.len());
        let base_score = wire
            .base_score
            .filter(|s| (0.0..=MAX_SCORE).contains(s));

        Ok(ToolReport::new(issues, violation_count, base_score))
    }
}

// ============================================================================
// Inline comments check
// ============================================================================

pub struct InlineCommentsCheck {
    client: Arc<TextGenerationClient>,
}

impl InlineCommentsCheck {
    pub fn new(client: Arc<TextGenerationClient>) -> Self {
        Self { client }
    }

    /// Every issue is Minor with score 8; the base score is always 8.
    pub async fn run(&self, source: &SourceFile) -> AppResult<ToolReport> {
        let prompt = prompts::inline_comments(&source.numbered());
        let reply = self.client.generate(&prompt).await?;
        let wire: ReportListWire = recover_or_default(&reply, "inline_comments");

        let issues: Vec<Issue> =
            validate_records::<InlineIssueWire, InlineIssue>(wire.report, "inline_comments")
                .into_iter()
                .map(|InlineIssue(issue)| issue)
                .collect();
        Ok(ToolReport::from_issues(issues, Some(INLINE_COMMENT_SCORE)))
    }
}
