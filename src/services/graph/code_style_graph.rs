//! Code Style Graph
//!
//! State machine for the code-style category:
//!
//! ```text
//! Start -> LanguageDetection -> {PythonCheck | SqlPythonCheck}
//!       -> InlineCommentsCheck -> ReportMerger -> RefactorCode -> End
//! ```
//!
//! Nodes run one at a time. The edge out of LanguageDetection is a pure
//! function of the detected language; an unsupported language stops the run
//! before any analysis call is made.

use std::sync::Arc;

use review_cascade_core::{Language, MergedReport, SourceFile};
use review_cascade_llm::TextGenerationClient;
use review_cascade_scanners::StaticScanner;

use super::merge::{merge_reports, ReportMerger};
use super::state::{AnalysisState, GraphNode};
use crate::services::agents::{
    InlineCommentsCheck, LanguageDetector, PythonCheck, RefactorNode, SqlPythonCheck,
};
use crate::utils::error::{AppError, AppResult};

/// Upper bound on node executions for one run.
const MAX_STEPS: usize = 16;

pub struct CodeStyleGraph {
    client: Arc<TextGenerationClient>,
    detector: LanguageDetector,
    python_check: PythonCheck,
    sql_check: SqlPythonCheck,
    inline_check: InlineCommentsCheck,
    merger: Arc<dyn ReportMerger>,
    refactor: RefactorNode,
}

impl CodeStyleGraph {
    pub fn new(
        client: Arc<TextGenerationClient>,
        pylint: Arc<dyn StaticScanner>,
        merger: Arc<dyn ReportMerger>,
    ) -> Self {
        Self {
            detector: LanguageDetector::new(client.clone()),
            python_check: PythonCheck::new(client.clone(), pylint),
            sql_check: SqlPythonCheck::new(client.clone()),
            inline_check: InlineCommentsCheck::new(client.clone()),
            refactor: RefactorNode::new(client.clone()),
            merger,
            client,
        }
    }

    /// Run the graph for one file and return the final state.
    pub async fn run(&self, source: &SourceFile, category: &str) -> AppResult<AnalysisState> {
        let mut state = AnalysisState::new(source.name.clone());
        let mut node = GraphNode::Start;
        let mut steps = 0;

        while node != GraphNode::End {
            steps += 1;
            if steps > MAX_STEPS {
                return Err(AppError::internal(format!(
                    "code style graph exceeded {} steps",
                    MAX_STEPS
                )));
            }
            if self.client.cancellation_token().is_cancelled() {
                return Err(AppError::Cancelled);
            }

            tracing::debug!(file = %source.name, node = %node, "Executing graph node");
            self.execute_node(node, &mut state, source, category).await?;
            state.record_visit(node);
            node = next_node(node, &state)?;
        }
        state.record_visit(GraphNode::End);
        Ok(state)
    }

    async fn execute_node(
        &self,
        node: GraphNode,
        state: &mut AnalysisState,
        source: &SourceFile,
        category: &str,
    ) -> AppResult<()> {
        match node {
            GraphNode::Start | GraphNode::End => {}
            GraphNode::LanguageDetection => {
                state.set_language(self.detector.detect(source).await?);
            }
            GraphNode::PythonCheck => {
                state.set_language_report(self.python_check.run(source).await?);
            }
            GraphNode::SqlPythonCheck => {
                state.set_language_report(self.sql_check.run(source).await?);
            }
            GraphNode::InlineCommentsCheck => {
                state.set_inline_report(self.inline_check.run(source).await?);
            }
            GraphNode::ReportMerger => {
                let merged = match (state.language_report(), state.inline_report()) {
                    (Some(first), Some(second)) => {
                        merge_reports(self.merger.as_ref(), first, second).await?
                    }
                    _ => {
                        tracing::warn!(file = %source.name, "Merge input missing, using empty report");
                        MergedReport::empty()
                    }
                };
                state.set_merged_report(merged);
            }
            GraphNode::RefactorCode => {
                let merged = state.merged_report().cloned().unwrap_or_default();
                let report = self.refactor.evaluate(source, &merged, category).await?;
                state.set_evaluation(report);
            }
        }
        Ok(())
    }
}

/// Next node after `current`, given the state so far.
pub fn next_node(current: GraphNode, state: &AnalysisState) -> AppResult<GraphNode> {
    Ok(match current {
        GraphNode::Start => GraphNode::LanguageDetection,
        GraphNode::LanguageDetection => {
            let fallback = Language::default();
            let language = state.language().unwrap_or(&fallback);
            GraphNode::from(language.route()?)
        }
        GraphNode::PythonCheck | GraphNode::SqlPythonCheck => GraphNode::InlineCommentsCheck,
        GraphNode::InlineCommentsCheck => GraphNode::ReportMerger,
        GraphNode::ReportMerger => GraphNode::RefactorCode,
        GraphNode::RefactorCode | GraphNode::End => GraphNode::End,
    })
}
