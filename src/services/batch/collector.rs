//! Result Collector
//!
//! Batch-scoped accumulator for file rows, line rows and outcomes. Owned by
//! the batch loop and passed by `&mut`; `reset()` clears it between runs.

use review_cascade_core::EvaluationReport;

use crate::models::review::{
    FileLevelRow, FileOutcome, LineLevelRow, OutcomeRow, ReviewCategory,
};

#[derive(Debug, Default)]
pub struct ResultCollector {
    file_rows: Vec<FileLevelRow>,
    line_rows: Vec<LineLevelRow>,
    outcomes: Vec<OutcomeRow>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.file_rows.clear();
        self.line_rows.clear();
        self.outcomes.clear();
    }

    /// Record a successful category review.
    pub fn record_success(
        &mut self,
        filename: &str,
        category: ReviewCategory,
        report: &EvaluationReport,
    ) {
        self.file_rows
            .push(FileLevelRow::from_report(filename, category, report));
        self.line_rows.extend(
            report
                .details
                .iter()
                .map(|d| LineLevelRow::from_detail(filename, category, d)),
        );
        self.outcomes.push(OutcomeRow {
            filename: filename.to_string(),
            category,
            outcome: FileOutcome::Succeeded,
        });
    }

    pub fn record_failure(
        &mut self,
        filename: &str,
        category: ReviewCategory,
        reason: impl Into<String>,
    ) {
        self.outcomes.push(OutcomeRow {
            filename: filename.to_string(),
            category,
            outcome: FileOutcome::Failed {
                reason: reason.into(),
            },
        });
    }

    pub fn file_rows(&self) -> &[FileLevelRow] {
        &self.file_rows
    }

    pub fn line_rows(&self) -> &[LineLevelRow] {
        &self.line_rows
    }

    pub fn outcomes(&self) -> &[OutcomeRow] {
        &self.outcomes
    }

    /// File rows of one category, in processing order
    pub fn rows_for(&self, category: ReviewCategory) -> impl Iterator<Item = &FileLevelRow> {
        self.file_rows.iter().filter(move |r| r.category == category)
    }

    /// Files with at least one failed category, in processing order.
    pub fn failed_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = Vec::new();
        for row in self.outcomes.iter().filter(|o| o.outcome.is_failed()) {
            if !files.contains(&row.filename.as_str()) {
                files.push(&row.filename);
            }
        }
        files
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
