//! Security Review
//!
//! Python files combine three sub-scans: bandit, detect-secrets and an LLM
//! input-validation review. Each scanner finding then gets its own risk
//! score call. SQL files get a generation-only security review.
//!
//! A risk score that cannot be obtained keeps the finding with score -1 and
//! a `score_error` note; only cancellation aborts the loop.

use std::sync::Arc;

use review_cascade_core::{
    parse_payload, EvaluationDetail, EvaluationReport, SourceFile, SourceKind, UNSCORED,
};
use review_cascade_llm::TextGenerationClient;
use review_cascade_scanners::{RawFinding, StaticScanner};

use super::evaluation::FindingEvaluator;
use super::wire::RiskScoreWire;
use super::{parse_findings, prompts};
use crate::utils::error::{AppError, AppResult};

pub struct SecurityReviewer {
    client: Arc<TextGenerationClient>,
    bandit: Arc<dyn StaticScanner>,
    secrets: Arc<dyn StaticScanner>,
    evaluator: FindingEvaluator,
}

impl SecurityReviewer {
    pub fn new(
        client: Arc<TextGenerationClient>,
        bandit: Arc<dyn StaticScanner>,
        secrets: Arc<dyn StaticScanner>,
    ) -> Self {
        Self {
            evaluator: FindingEvaluator::new(client.clone()),
            client,
            bandit,
            secrets,
        }
    }

    pub async fn run(&self, source: &SourceFile, category: &str) -> AppResult<EvaluationReport> {
        let findings = match source.kind {
            SourceKind::Python => self.python_findings(source).await?,
            SourceKind::Sql => {
                let reply = self
                    .client
                    .generate(&prompts::sql_security(&source.numbered()))
                    .await?;
                parse_findings(&reply, "sql_security")
            }
        };
        self.evaluator.evaluate(source, findings, category).await
    }

    async fn python_findings(&self, source: &SourceFile) -> AppResult<Vec<EvaluationDetail>> {
        let mut raw = self.bandit.scan(source).await?.findings;
        raw.extend(self.secrets.scan(source).await?.findings);
        tracing::info!(file = %source.name, findings = raw.len(), "Security scanners finished");

        let numbered = source.numbered();
        let mut findings = Vec::with_capacity(raw.len());
        for finding in &raw {
            findings.push(self.score_finding(&numbered, finding).await?);
        }

        let reply = self
            .client
            .generate(&prompts::input_validation(&numbered))
            .await?;
        findings.extend(parse_findings(&reply, "input_validation"));
        Ok(findings)
    }

    /// One risk-score call for one scanner finding.
    async fn score_finding(
        &self,
        numbered: &str,
        finding: &RawFinding,
    ) -> AppResult<EvaluationDetail> {
        let scored = match self
            .client
            .generate(&prompts::risk_score(numbered, finding))
            .await
        {
            Ok(reply) => parse_payload::<RiskScoreWire>(&reply)
                .map_err(|e| e.to_string())
                .and_then(|wire| wire.validated()),
            Err(e) if e.is_cancelled() => return Err(AppError::Cancelled),
            Err(e) => Err(e.to_string()),
        };

        let (score, score_error) = match scored {
            Ok(score) => (score, None),
            Err(reason) => {
                tracing::warn!(
                    tool = %finding.source,
                    code = %finding.code,
                    line = finding.start_line,
                    %reason,
                    "Risk score unavailable"
                );
                (UNSCORED, Some(format!("risk score unavailable: {}", reason)))
            }
        };

        Ok(EvaluationDetail {
            start_line: finding.start_line,
            end_line: finding.end_line,
            original_snippet: finding.snippet.clone(),
            refactored_snippet: None,
            issue_summary: finding.message.clone(),
            severity: finding.severity,
            score,
            score_error,
        })
    }
}
