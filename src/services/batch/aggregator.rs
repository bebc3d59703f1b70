//! Cross-Category Aggregator
//!
//! Numeric roll-up per category and for the repository, plus the
//! tree-shaped narrative: per-file summaries fan into one text per category,
//! and the three category texts fan into the repository text. Every fan-in
//! is a generation call.
//!
//! The overall score is the mean of the defined category means, so each
//! category weighs the same regardless of how many issues it holds.

use std::sync::Arc;

use review_cascade_core::mean;
use review_cascade_llm::TextGenerationClient;

use super::collector::ResultCollector;
use crate::models::review::{
    CategorySummary, FileLevelRow, RepositorySummary, ReviewCategory,
};
use crate::services::agents::prompts;
use crate::utils::error::{AppError, AppResult};

/// Placeholder for a narrative whose generation call failed.
pub const NARRATIVE_UNAVAILABLE: &str = "Summary unavailable: the summary request failed.";

/// Narrative for a category no file reached.
pub const NO_FILES_REVIEWED: &str = "No files were reviewed for this category.";

/// Violations and mean score over file rows.
pub fn category_totals<'a>(
    rows: impl IntoIterator<Item = &'a FileLevelRow>,
) -> (usize, usize, Option<f64>) {
    let rows: Vec<&FileLevelRow> = rows.into_iter().collect();
    let violations = rows.iter().map(|r| r.violations).sum();
    let score = mean(rows.iter().filter_map(|r| r.score));
    (rows.len(), violations, score)
}

pub struct Aggregator {
    client: Arc<TextGenerationClient>,
}

impl Aggregator {
    pub fn new(client: Arc<TextGenerationClient>) -> Self {
        Self { client }
    }

    pub async fn summarize(&self, collector: &ResultCollector) -> AppResult<RepositorySummary> {
        let mut categories = Vec::with_capacity(ReviewCategory::ALL.len());
        for category in ReviewCategory::ALL {
            categories.push(self.summarize_category(category, collector).await?);
        }

        let violations = categories.iter().map(|c| c.violations).sum();
        let score = mean(categories.iter().filter_map(|c| c.score));

        let (issue_summary, refactor_summary) = if categories.iter().all(|c| c.files == 0) {
            (NO_FILES_REVIEWED.to_string(), NO_FILES_REVIEWED.to_string())
        } else {
            let text = |category: ReviewCategory, issue: bool| {
                categories
                    .iter()
                    .find(|c| c.category == category)
                    .map(|c| {
                        if issue {
                            c.issue_summary.as_str()
                        } else {
                            c.refactor_summary.as_str()
                        }
                    })
                    .unwrap_or(NO_FILES_REVIEWED)
            };
            let issue_prompt = prompts::repository_issue_summary(
                text(ReviewCategory::CodeStyle, true),
                text(ReviewCategory::DryModularity, true),
                text(ReviewCategory::Security, true),
            );
            let refactor_prompt = prompts::repository_refactor_summary(
                text(ReviewCategory::CodeStyle, false),
                text(ReviewCategory::DryModularity, false),
                text(ReviewCategory::Security, false),
            );
            (
                self.narrate(&issue_prompt, "repository_issue_summary").await?,
                self.narrate(&refactor_prompt, "repository_refactor_summary").await?,
            )
        };

        tracing::info!(violations, score = ?score, "Repository summary ready");
        Ok(RepositorySummary {
            categories,
            violations,
            score,
            issue_summary,
            refactor_summary,
        })
    }

    async fn summarize_category(
        &self,
        category: ReviewCategory,
        collector: &ResultCollector,
    ) -> AppResult<CategorySummary> {
        let (files, violations, score) = category_totals(collector.rows_for(category));

        let (issue_summary, refactor_summary) = if files == 0 {
            (NO_FILES_REVIEWED.to_string(), NO_FILES_REVIEWED.to_string())
        } else {
            let issues = join_summaries(collector.rows_for(category), |r| &r.issue_summary);
            let refactors = join_summaries(collector.rows_for(category), |r| &r.refactor_summary);
            (
                self.narrate(
                    &prompts::category_issue_summary(category.label(), &issues),
                    "category_issue_summary",
                )
                .await?,
                self.narrate(
                    &prompts::category_refactor_summary(category.label(), &refactors),
                    "category_refactor_summary",
                )
                .await?,
            )
        };

        Ok(CategorySummary {
            category,
            files,
            violations,
            score,
            issue_summary,
            refactor_summary,
        })
    }

    /// Plain-text generation that degrades to a placeholder on failure.
    async fn narrate(&self, prompt: &str, context: &str) -> AppResult<String> {
        match self.client.generate(prompt).await {
            Ok(text) => Ok(text.trim().to_string()),
            Err(e) if e.is_cancelled() => Err(AppError::Cancelled),
            Err(e) => {
                tracing::warn!(context, error = %e, "Narrative generation failed");
                Ok(NARRATIVE_UNAVAILABLE.to_string())
            }
        }
    }
}

fn join_summaries<'a, F>(rows: impl Iterator<Item = &'a FileLevelRow>, pick: F) -> String
where
    F: Fn(&'a FileLevelRow) -> &'a String,
{
    rows.map(|r| format!("File: {}\n{}", r.filename, pick(r)))
        .collect::<Vec<_>>()
        .join("\n\n")
}
