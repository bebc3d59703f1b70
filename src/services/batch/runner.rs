//! Batch Runner
//!
//! Drives every file through every category, one file at a time. Failures
//! stay inside their file/category and are recorded as failed outcomes,
//! except an unsupported language, which fails the rest of the file. Only
//! cancellation stops the batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use review_cascade_core::SourceFile;
use review_cascade_llm::CancellationToken;

use super::category::CategoryReviewer;
use super::collector::ResultCollector;
use crate::utils::error::{AppError, AppResult};

pub struct BatchRunner {
    reviewers: Vec<Arc<dyn CategoryReviewer>>,
    cancel: CancellationToken,
}

impl BatchRunner {
    pub fn new(reviewers: Vec<Arc<dyn CategoryReviewer>>, cancel: CancellationToken) -> Self {
        Self { reviewers, cancel }
    }

    /// Review `files` in order, accumulating into `collector`.
    ///
    /// Returns `AppError::Cancelled` when the token fires; rows recorded up
    /// to that point stay in the collector.
    pub async fn run(&self, files: &[PathBuf], collector: &mut ResultCollector) -> AppResult<()> {
        tracing::info!(files = files.len(), categories = self.reviewers.len(), "Starting review batch");
        for (idx, path) in files.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::warn!(processed = idx, "Review batch cancelled");
                return Err(AppError::Cancelled);
            }
            tracing::info!(file = %path.display(), index = idx + 1, total = files.len(), "Reviewing file");
            self.process_file(path, collector).await?;
        }
        Ok(())
    }

    async fn process_file(&self, path: &Path, collector: &mut ResultCollector) -> AppResult<()> {
        let source = match SourceFile::load(path) {
            Ok(source) => source,
            Err(e) => {
                let name = path.display().to_string();
                tracing::error!(file = %name, error = %e, "Cannot load file");
                for reviewer in &self.reviewers {
                    collector.record_failure(&name, reviewer.category(), e.to_string());
                }
                return Ok(());
            }
        };

        for (idx, reviewer) in self.reviewers.iter().enumerate() {
            let category = reviewer.category();
            if self.cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }
            match reviewer.review(&source).await {
                Ok(report) => {
                    tracing::info!(
                        file = %source.name,
                        category = %category,
                        violations = report.violation_count,
                        score = ?report.evaluation_score,
                        "Category review finished"
                    );
                    collector.record_success(&source.name, category, &report);
                }
                Err(e) if e.is_cancelled() => return Err(AppError::Cancelled),
                Err(e) if e.is_unsupported_input() => {
                    // the remaining categories are skipped with the same reason
                    let reason = e.to_string();
                    tracing::error!(file = %source.name, category = %category, error = %reason, "File cannot be reviewed");
                    for skipped in &self.reviewers[idx..] {
                        collector.record_failure(&source.name, skipped.category(), reason.clone());
                    }
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!(file = %source.name, category = %category, error = %e, "Category review failed");
                    collector.record_failure(&source.name, category, e.to_string());
                }
            }
        }
        Ok(())
    }
}
