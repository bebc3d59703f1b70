//! Refactor Node
//!
//! Turns merged issues into evaluation details with before/after snippets.
//! The reply is validated for shape only; whether the refactored snippet
//! stays inside the issue's line span is left to the model.

use std::sync::Arc;

use review_cascade_core::{
    mean, parse_payload, EvaluationDetail, EvaluationReport, Issue, MergedReport, SourceFile,
};
use review_cascade_llm::TextGenerationClient;

use super::prompts;
use super::wire::{validate_records, DetailWire, RefactorWire};
use crate::utils::error::AppResult;

/// Summary used when the refactor reply could not be read.
pub const SUMMARY_UNAVAILABLE: &str =
    "Summary unavailable: the refactor response could not be parsed.";

pub fn no_issues_summary(category: &str) -> String {
    format!(
        "No issues found while reviewing the code for {} compliance.",
        category
    )
}

pub fn no_refactor_summary(category: &str) -> String {
    format!(
        "No refactor suggestions since the issues are not found while reviewing the code for {} compliance.",
        category
    )
}

/// Parsed refactor reply
#[derive(Debug, Clone)]
pub struct RefactorOutcome {
    pub issue_summary: String,
    pub refactor_summary: String,
    pub details: Vec<EvaluationDetail>,
}

pub struct RefactorNode {
    client: Arc<TextGenerationClient>,
}

impl RefactorNode {
    pub fn new(client: Arc<TextGenerationClient>) -> Self {
        Self { client }
    }

    /// One refactor call for `issues`. `None` when the reply is malformed.
    pub async fn request(
        &self,
        source: &SourceFile,
        issues: &[Issue],
    ) -> AppResult<Option<RefactorOutcome>> {
        let prompt = prompts::refactor(&source.numbered(), issues, source.kind.display_name());
        let reply = self.client.generate(&prompt).await?;

        let wire: RefactorWire = match parse_payload(&reply) {
            Ok(wire) => wire,
            Err(e) => {
                tracing::warn!(file = %source.name, error = %e, "Malformed refactor response");
                return Ok(None);
            }
        };
        let details = validate_records::<DetailWire, EvaluationDetail>(
            wire.evaluation_details,
            "refactor",
        );
        Ok(Some(RefactorOutcome {
            issue_summary: wire.overall_issue_summary,
            refactor_summary: wire.overall_refactor_summary,
            details,
        }))
    }

    /// Build the evaluation report for a merged code-style report.
    pub async fn evaluate(
        &self,
        source: &SourceFile,
        merged: &MergedReport,
        category: &str,
    ) -> AppResult<EvaluationReport> {
        if merged.issues.is_empty() {
            return Ok(EvaluationReport::from_details(
                no_issues_summary(category),
                no_refactor_summary(category),
                Vec::new(),
            ));
        }

        let issue_mean = mean(
            merged
                .issues
                .iter()
                .filter(|i| i.is_scored())
                .map(|i| i.score),
        );

        let Some(outcome) = self.request(source, &merged.issues).await? else {
            return Ok(EvaluationReport {
                violation_count: merged.issues.len(),
                evaluation_score: issue_mean,
                issue_summary: SUMMARY_UNAVAILABLE.to_string(),
                refactor_summary: SUMMARY_UNAVAILABLE.to_string(),
                details: Vec::new(),
            });
        };

        let details: Vec<EvaluationDetail> = outcome
            .details
            .into_iter()
            .map(|d| d.annotate_unscored("score unavailable"))
            .collect();
        let evaluation_score = EvaluationReport::mean_score(&details).or(issue_mean);

        tracing::info!(
            file = %source.name,
            issues = merged.issues.len(),
            details = details.len(),
            score = ?evaluation_score,
            "Refactor finished"
        );
        Ok(EvaluationReport {
            violation_count: merged.issues.len(),
            evaluation_score,
            issue_summary: outcome.issue_summary,
            refactor_summary: outcome.refactor_summary,
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_cascade_core::Severity;
    use review_cascade_llm::ScriptedProvider;

    fn node(replies: Vec<&str>) -> (Arc<ScriptedProvider>, RefactorNode) {
        let provider = Arc::new(ScriptedProvider::queue(
            replies.into_iter().map(|r| Ok(r.to_string())).collect(),
        ));
        let client = Arc::new(TextGenerationClient::new(provider.clone()));
        (provider, RefactorNode::new(client))
    }

    fn source() -> SourceFile {
        SourceFile::from_content("m.py", "def f(a,b):\n  return a+b\n").unwrap()
    }

    fn merged() -> MergedReport {
        MergedReport::new(
            vec![
                Issue::new(1, 1, Severity::Moderate, 4.0, "spacing"),
                Issue::new(2, 2, Severity::Minor, 6.0, "indent"),
            ],
            Some(5.0),
        )
    }

    #[tokio::test]
    async fn test_no_issues_makes_no_call() {
        let (provider, node) = node(vec![]);
        let report = node
            .evaluate(&source(), &MergedReport::empty(), "Code Style and Consistency")
            .await
            .unwrap();
        assert_eq!(provider.call_count(), 0);
        assert_eq!(report.evaluation_score, None);
        assert_eq!(report.violation_count, 0);
        assert!(report.issue_summary.starts_with("No issues found"));
    }

    #[tokio::test]
    async fn test_refactor_details_drive_score() {
        let (_, node) = node(vec![
            r#"{"overall_issue_summary": "Spacing {is} off", "overall_refactor_summary": "Fixed",
                "evaluation_details": [
                  {"start_line_number": 1, "end_line_number": 1, "original_code_snippet": "def f(a,b):",
                   "refactored_code_snippet": "def f(a, b):", "issue_summary": "spacing", "severity": "Moderate", "score": 4},
                  {"start_line_number": 2, "end_line_number": 2, "original_code_snippet": "  return a+b",
                   "refactored_code_snippet": "    return a + b", "issue_summary": "indent", "severity": "Minor", "score": -1}
                ]}"#,
        ]);
        let report = node
            .evaluate(&source(), &merged(), "Code Style and Consistency")
            .await
            .unwrap();
        assert_eq!(report.violation_count, 2);
        assert_eq!(report.evaluation_score, Some(4.0));
        assert_eq!(report.issue_summary, "Spacing {is} off");
        assert!(report.details[1].score_error.is_some());
    }

    #[tokio::test]
    async fn test_malformed_reply_degrades() {
        let (_, node) = node(vec!["Sorry, I cannot help with that."]);
        let report = node
            .evaluate(&source(), &merged(), "Code Style and Consistency")
            .await
            .unwrap();
        assert_eq!(report.violation_count, 2);
        assert_eq!(report.evaluation_score, Some(5.0));
        assert!(report.details.is_empty());
        assert_eq!(report.issue_summary, SUMMARY_UNAVAILABLE);
    }
}
