//! Report Merge
//!
//! Coalesces two tool reports for the same file. Issues on the same line
//! span become one: descriptions joined with `"; "`, the most severe
//! severity, and the lowest score (unscored members only count when the
//! whole group is unscored). Exact duplicates collapse to one copy.
//!
//! The coalescing is behind [`ReportMerger`]; the bookkeeping (base-score
//! mean, violation count) is shared by every implementation.

use std::sync::Arc;

use async_trait::async_trait;

use review_cascade_core::{mean, parse_payload, Issue, MergedReport, ToolReport, UNSCORED};
use review_cascade_llm::TextGenerationClient;

use crate::services::agents::prompts;
use crate::services::agents::wire::{validate_records, IssueWire, ReportListWire};
use crate::utils::error::AppResult;

#[async_trait]
pub trait ReportMerger: Send + Sync {
    fn name(&self) -> &'static str;

    /// Coalesce the issues of two reports.
    async fn coalesce(&self, first: &[Issue], second: &[Issue]) -> AppResult<Vec<Issue>>;
}

/// Merge two reports through `merger`.
pub async fn merge_reports(
    merger: &dyn ReportMerger,
    first: &ToolReport,
    second: &ToolReport,
) -> AppResult<MergedReport> {
    let issues = merger.coalesce(&first.issues, &second.issues).await?;
    let base_score = mean([first.base_score, second.base_score].into_iter().flatten());
    tracing::info!(
        merger = merger.name(),
        first = first.issues.len(),
        second = second.issues.len(),
        merged = issues.len(),
        "Reports merged"
    );
    Ok(MergedReport::new(issues, base_score))
}

// ============================================================================
// Mechanical merger
// ============================================================================

/// Deterministic span-based merge.
#[derive(Debug, Default, Clone, Copy)]
pub struct MechanicalMerger;

#[async_trait]
impl ReportMerger for MechanicalMerger {
    fn name(&self) -> &'static str {
        "mechanical"
    }

    async fn coalesce(&self, first: &[Issue], second: &[Issue]) -> AppResult<Vec<Issue>> {
        Ok(coalesce_issues(first.iter().chain(second)))
    }
}

/// Group by line span in order of first appearance and coalesce each group.
pub fn coalesce_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Vec<Issue> {
    let mut groups: Vec<Vec<&Issue>> = Vec::new();
    for issue in issues {
        match groups.iter_mut().find(|g| g[0].span() == issue.span()) {
            Some(group) => {
                if !group.iter().any(|existing| *existing == issue) {
                    group.push(issue);
                }
            }
            None => groups.push(vec![issue]),
        }
    }
    groups.into_iter().map(coalesce_group).collect()
}

fn coalesce_group(group: Vec<&Issue>) -> Issue {
    let first = group[0];
    if group.len() == 1 {
        return first.clone();
    }

    let severity = group
        .iter()
        .skip(1)
        .fold(first.severity, |acc, i| acc.most_severe(i.severity));
    let score = group
        .iter()
        .filter(|i| i.is_scored())
        .map(|i| i.score)
        .reduce(f64::min)
        .unwrap_or(UNSCORED);

    let mut descriptions: Vec<&str> = Vec::new();
    for issue in &group {
        if !descriptions.contains(&issue.description.as_str()) {
            descriptions.push(&issue.description);
        }
    }

    Issue::new(
        first.start_line,
        first.end_line,
        severity,
        score,
        descriptions.join("; "),
    )
}

// ============================================================================
// LLM merger
// ============================================================================

/// Model-driven merge; a malformed reply falls back to the mechanical one.
pub struct LlmMerger {
    client: Arc<TextGenerationClient>,
}

impl LlmMerger {
    pub fn new(client: Arc<TextGenerationClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReportMerger for LlmMerger {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn coalesce(&self, first: &[Issue], second: &[Issue]) -> AppResult<Vec<Issue>> {
        if first.is_empty() && second.is_empty() {
            return Ok(Vec::new());
        }

        let reply = self
            .client
            .generate(&prompts::merge_reports(first, second))
            .await?;
        match parse_payload::<ReportListWire>(&reply) {
            Ok(wire) => {
                let issues = validate_records::<IssueWire, Issue>(wire.report, "merge");
                if issues.is_empty() {
                    tracing::warn!("Merge response held no valid issues, merging mechanically");
                    return Ok(coalesce_issues(first.iter().chain(second)));
                }
                // the model may still leave two entries on one span
                Ok(coalesce_issues(&issues))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Malformed merge response, merging mechanically");
                Ok(coalesce_issues(first.iter().chain(second)))
            }
        }
    }
}
