//! Review Pipeline
//!
//! Wires configuration, the text-generation client, the scanners and the
//! three category reviewers into one batch run that ends in a written report.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use review_cascade_llm::{CancellationToken, LlmProvider, OpenAIProvider, TextGenerationClient};
use review_cascade_scanners::{BanditScanner, PylintScanner, SecretsScanner, StaticScanner};

use crate::config::{MergeStrategy, ReviewConfig, ScannerSettings};
use crate::models::review::{OutcomeRow, ReviewReport};
use crate::services::agents::{DryModularityReviewer, SecurityReviewer};
use crate::services::batch::{Aggregator, BatchRunner, CategoryReviewer, ResultCollector};
use crate::services::graph::{CodeStyleGraph, LlmMerger, MechanicalMerger, ReportMerger};
use crate::services::report::{build_report, write_report};
use crate::utils::error::AppResult;
use crate::utils::paths::collect_review_files;

/// The external tools one run uses
#[derive(Clone)]
pub struct Scanners {
    pub pylint: Arc<dyn StaticScanner>,
    pub bandit: Arc<dyn StaticScanner>,
    pub secrets: Arc<dyn StaticScanner>,
}

impl Scanners {
    /// Process-backed scanners with the configured overrides applied.
    pub fn from_settings(settings: &ScannerSettings) -> Self {
        Self {
            pylint: Arc::new(PylintScanner::new(
                settings.pylint.apply(PylintScanner::default_command()),
            )),
            bandit: Arc::new(BanditScanner::new(
                settings.bandit.apply(BanditScanner::default_command()),
            )),
            secrets: Arc::new(SecretsScanner::new(
                settings.detect_secrets.apply(SecretsScanner::default_command()),
            )),
        }
    }
}

/// Result of a finished run
#[derive(Debug)]
pub struct RunSummary {
    pub report: ReviewReport,
    pub report_path: PathBuf,
    pub files_reviewed: usize,
    pub failed_files: Vec<String>,
}

impl RunSummary {
    pub fn failures(&self) -> impl Iterator<Item = &OutcomeRow> {
        self.report.outcomes.iter().filter(|o| o.outcome.is_failed())
    }
}

pub struct ReviewPipeline {
    config: ReviewConfig,
    runner: BatchRunner,
    aggregator: Aggregator,
}

impl ReviewPipeline {
    /// Build a pipeline talking to the configured provider and real tools.
    pub fn from_config(config: ReviewConfig, cancel: CancellationToken) -> AppResult<Self> {
        config.validate()?;
        let provider = Arc::new(OpenAIProvider::new(config.llm.clone())?);
        let scanners = Scanners::from_settings(&config.scanners);
        Ok(Self::with_provider(config, provider, scanners, cancel))
    }

    /// Build a pipeline over any provider and scanner set.
    pub fn with_provider(
        config: ReviewConfig,
        provider: Arc<dyn LlmProvider>,
        scanners: Scanners,
        cancel: CancellationToken,
    ) -> Self {
        let client = Arc::new(
            TextGenerationClient::new(provider)
                .with_policy(config.retry.clone())
                .with_cancellation(cancel.clone()),
        );

        let merger: Arc<dyn ReportMerger> = match config.merge_strategy {
            MergeStrategy::Llm => Arc::new(LlmMerger::new(client.clone())),
            MergeStrategy::Mechanical => Arc::new(MechanicalMerger),
        };
        let reviewers: Vec<Arc<dyn CategoryReviewer>> = vec![
            Arc::new(CodeStyleGraph::new(client.clone(), scanners.pylint, merger)),
            Arc::new(DryModularityReviewer::new(client.clone())),
            Arc::new(SecurityReviewer::new(
                client.clone(),
                scanners.bandit,
                scanners.secrets,
            )),
        ];

        Self {
            runner: BatchRunner::new(reviewers, cancel),
            aggregator: Aggregator::new(client),
            config,
        }
    }

    /// Review `inputs` (files or directories) and write the report.
    pub async fn run(&self, inputs: &[PathBuf]) -> AppResult<RunSummary> {
        let files = collect_review_files(inputs);
        tracing::info!(inputs = inputs.len(), files = files.len(), "Collected review files");

        let mut collector = ResultCollector::new();
        self.runner.run(&files, &mut collector).await?;

        let summary = self.aggregator.summarize(&collector).await?;
        let report = build_report(&summary, &collector, Utc::now());
        let report_path = write_report(&report, &self.config.output_dir)?;

        Ok(RunSummary {
            failed_files: collector
                .failed_files()
                .into_iter()
                .map(str::to_string)
                .collect(),
            files_reviewed: files.len(),
            report,
            report_path,
        })
    }
}
