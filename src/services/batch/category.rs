//! Category Reviewers
//!
//! One [`CategoryReviewer`] per review category. The batch runner only sees
//! this trait, so tests can swap in scripted reviewers.

use async_trait::async_trait;

use review_cascade_core::{EvaluationReport, SourceFile};

use crate::models::review::ReviewCategory;
use crate::services::agents::{DryModularityReviewer, SecurityReviewer};
use crate::services::graph::CodeStyleGraph;
use crate::utils::error::{AppError, AppResult};

#[async_trait]
pub trait CategoryReviewer: Send + Sync {
    fn category(&self) -> ReviewCategory;

    /// Review one file for this category.
    async fn review(&self, source: &SourceFile) -> AppResult<EvaluationReport>;
}

#[async_trait]
impl CategoryReviewer for CodeStyleGraph {
    fn category(&self) -> ReviewCategory {
        ReviewCategory::CodeStyle
    }

    async fn review(&self, source: &SourceFile) -> AppResult<EvaluationReport> {
        let state = self.run(source, ReviewCategory::CodeStyle.label()).await?;
        tracing::debug!(file = %source.name, visited = ?state.visited(), "Code style graph finished");
        state
            .into_evaluation()
            .ok_or_else(|| AppError::internal("code style graph ended without an evaluation"))
    }
}

#[async_trait]
impl CategoryReviewer for DryModularityReviewer {
    fn category(&self) -> ReviewCategory {
        ReviewCategory::DryModularity
    }

    async fn review(&self, source: &SourceFile) -> AppResult<EvaluationReport> {
        self.run(source, ReviewCategory::DryModularity.label()).await
    }
}

#[async_trait]
impl CategoryReviewer for SecurityReviewer {
    fn category(&self) -> ReviewCategory {
        ReviewCategory::Security
    }

    async fn review(&self, source: &SourceFile) -> AppResult<EvaluationReport> {
        self.run(source, ReviewCategory::Security.label()).await
    }
}
