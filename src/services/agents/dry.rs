//! DRY and Modularity Review

use std::sync::Arc;

use review_cascade_core::{EvaluationReport, SourceFile, SourceKind};
use review_cascade_llm::TextGenerationClient;

use super::evaluation::FindingEvaluator;
use super::{parse_findings, prompts};
use crate::utils::error::AppResult;

pub struct DryModularityReviewer {
    client: Arc<TextGenerationClient>,
    evaluator: FindingEvaluator,
}

impl DryModularityReviewer {
    pub fn new(client: Arc<TextGenerationClient>) -> Self {
        Self {
            evaluator: FindingEvaluator::new(client.clone()),
            client,
        }
    }

    pub async fn run(&self, source: &SourceFile, category: &str) -> AppResult<EvaluationReport> {
        let numbered = source.numbered();
        let prompt = match source.kind {
            SourceKind::Python => prompts::dry_python(&numbered),
            SourceKind::Sql => prompts::dry_sql(&numbered),
        };
        let reply = self.client.generate(&prompt).await?;
        let findings = parse_findings(&reply, "dry_modularity");
        tracing::info!(file = %source.name, findings = findings.len(), "DRY review finished");

        self.evaluator.evaluate(source, findings, category).await
    }
}
