//! Finding Evaluation
//!
//! Shared finish step for the finding-based categories (DRY/modularity and
//! security): a per-file narrative call, then a refactor call, then the
//! evaluation report.

use std::sync::Arc;

use review_cascade_core::{parse_payload, EvaluationDetail, EvaluationReport, Issue, SourceFile};
use review_cascade_llm::TextGenerationClient;

use super::prompts;
use super::refactor::{no_issues_summary, no_refactor_summary, RefactorNode};
use super::wire::SummaryWire;
use crate::utils::error::AppResult;

pub const ISSUE_SUMMARY_PARSE_ERROR: &str = "Parsing error: Unable to extract issue summary.";
pub const REFACTOR_SUMMARY_PARSE_ERROR: &str = "Parsing error: Unable to extract refactor summary.";

pub struct FindingEvaluator {
    client: Arc<TextGenerationClient>,
    refactor: RefactorNode,
}

impl FindingEvaluator {
    pub fn new(client: Arc<TextGenerationClient>) -> Self {
        Self {
            refactor: RefactorNode::new(client.clone()),
            client,
        }
    }

    /// Evaluate `findings` for one file.
    ///
    /// Count and score come from the findings themselves; the refactor
    /// reply only contributes snippets. No findings means no calls.
    pub async fn evaluate(
        &self,
        source: &SourceFile,
        findings: Vec<EvaluationDetail>,
        category: &str,
    ) -> AppResult<EvaluationReport> {
        if findings.is_empty() {
            return Ok(EvaluationReport::from_details(
                no_issues_summary(category),
                no_refactor_summary(category),
                Vec::new(),
            ));
        }

        let (issue_summary, refactor_summary) = self.summarize(source, &findings).await?;

        let issues: Vec<Issue> = findings
            .iter()
            .map(|f| Issue::new(f.start_line, f.end_line, f.severity, f.score, f.issue_summary.clone()))
            .collect();
        let refactored = self
            .refactor
            .request(source, &issues)
            .await?
            .map(|outcome| outcome.details)
            .unwrap_or_default();

        let details = reconcile(&findings, refactored);
        let mut report = EvaluationReport::from_details(issue_summary, refactor_summary, details);
        report.violation_count = findings.len();
        report.evaluation_score = EvaluationReport::mean_score(&findings);

        tracing::info!(
            file = %source.name,
            category,
            findings = report.violation_count,
            score = ?report.evaluation_score,
            "Evaluation finished"
        );
        Ok(report)
    }

    async fn summarize(
        &self,
        source: &SourceFile,
        findings: &[EvaluationDetail],
    ) -> AppResult<(String, String)> {
        let findings_json =
            serde_json::to_string_pretty(findings).unwrap_or_else(|_| "[]".to_string());
        let reply = self
            .client
            .generate(&prompts::evaluation_summary(&findings_json))
            .await?;

        Ok(match parse_payload::<SummaryWire>(&reply) {
            Ok(summary) => (
                summary.evaluation_issue_summary,
                summary.evaluation_refactor_summary,
            ),
            Err(e) => {
                tracing::warn!(file = %source.name, error = %e, "Malformed evaluation summary");
                (
                    ISSUE_SUMMARY_PARSE_ERROR.to_string(),
                    REFACTOR_SUMMARY_PARSE_ERROR.to_string(),
                )
            }
        })
    }
}

/// Prefer the refactored details, keeping severity and score from the
/// matching finding. Without a usable refactor the findings stand as-is.
fn reconcile(
    findings: &[EvaluationDetail],
    refactored: Vec<EvaluationDetail>,
) -> Vec<EvaluationDetail> {
    if refactored.is_empty() {
        return findings
            .iter()
            .cloned()
            .map(|d| d.annotate_unscored("score unavailable"))
            .collect();
    }
    refactored
        .into_iter()
        .map(|mut detail| {
            if let Some(finding) = findings
                .iter()
                .find(|f| f.start_line == detail.start_line && f.end_line == detail.end_line)
            {
                detail.severity = finding.severity;
                detail.score = finding.score;
                detail.score_error = finding.score_error.clone();
                if detail.original_snippet.is_empty() {
                    detail.original_snippet = finding.original_snippet.clone();
                }
            }
            detail.annotate_unscored("score unavailable")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_cascade_core::{Severity, UNSCORED};
    use review_cascade_llm::ScriptedProvider;

    fn finding(line: u32, score: f64) -> EvaluationDetail {
        EvaluationDetail {
            start_line: line,
            end_line: line,
            original_snippet: format!("line {}", line),
            refactored_snippet: None,
            issue_summary: "duplicated block".to_string(),
            severity: Severity::Moderate,
            score,
            score_error: None,
        }
    }

    fn evaluator(replies: Vec<&str>) -> (Arc<ScriptedProvider>, FindingEvaluator) {
        let provider = Arc::new(ScriptedProvider::queue(
            replies.into_iter().map(|r| Ok(r.to_string())).collect(),
        ));
        let client = Arc::new(TextGenerationClient::new(provider.clone()));
        (provider, FindingEvaluator::new(client))
    }

    fn source() -> SourceFile {
        SourceFile::from_content("a.py", "a = 1\nb = 1\nc = 1\n").unwrap()
    }

    #[tokio::test]
    async fn test_no_findings_no_calls() {
        let (provider, evaluator) = evaluator(vec![]);
        let report = evaluator
            .evaluate(&source(), vec![], "DRY and Modularity")
            .await
            .unwrap();
        assert_eq!(provider.call_count(), 0);
        assert_eq!(report.evaluation_score, None);
        assert_eq!(
            report.refactor_summary,
            "No refactor suggestions since the issues are not found while reviewing the code for DRY and Modularity compliance."
        );
    }

    #[tokio::test]
    async fn test_summary_parse_failure_uses_fallback_text() {
        let (provider, evaluator) = evaluator(vec!["not json", "also not json"]);
        let report = evaluator
            .evaluate(&source(), vec![finding(1, 4.0), finding(2, UNSCORED)], "DRY and Modularity")
            .await
            .unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(report.issue_summary, ISSUE_SUMMARY_PARSE_ERROR);
        assert_eq!(report.refactor_summary, REFACTOR_SUMMARY_PARSE_ERROR);
        assert_eq!(report.violation_count, 2);
        assert_eq!(report.evaluation_score, Some(4.0));
        assert_eq!(report.details.len(), 2);
    }

    #[tokio::test]
    async fn test_refactor_keeps_finding_scores() {
        let (_, evaluator) = evaluator(vec![
            r#"{"evaluation_issue_summary": "Repeated constants", "evaluation_refactor_summary": "Extracted"}"#,
            r#"{"overall_issue_summary": "", "overall_refactor_summary": "", "evaluation_details": [
                {"start_line_number": 2, "end_line_number": 2, "original_code_snippet": "b = 1",
                 "refactored_code_snippet": "b = ONE", "issue_summary": "dup", "severity": "Minor", "score": 8}
            ]}"#,
        ]);
        let report = evaluator
            .evaluate(&source(), vec![finding(1, 4.0), finding(2, UNSCORED)], "DRY and Modularity")
            .await
            .unwrap();
        assert_eq!(report.issue_summary, "Repeated constants");
        assert_eq!(report.details.len(), 1);
        let detail = &report.details[0];
        assert_eq!(detail.refactored_snippet.as_deref(), Some("b = ONE"));
        assert_eq!(detail.severity, Severity::Moderate);
        assert_eq!(detail.score, UNSCORED);
        assert!(detail.score_error.is_some());
    }
}
