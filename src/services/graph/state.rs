//! Analysis State
//!
//! Context threaded through one code-style graph run for one file. Slots
//! are written at most once; a second write is ignored and logged.

use serde::Serialize;

use review_cascade_core::{AnalysisRoute, EvaluationReport, Language, MergedReport, ToolReport};

/// Nodes of the code-style graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphNode {
    Start,
    LanguageDetection,
    PythonCheck,
    SqlPythonCheck,
    InlineCommentsCheck,
    ReportMerger,
    RefactorCode,
    End,
}

impl GraphNode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphNode::Start => "start",
            GraphNode::LanguageDetection => "language_detection",
            GraphNode::PythonCheck => "python_check",
            GraphNode::SqlPythonCheck => "sql_python_check",
            GraphNode::InlineCommentsCheck => "inline_comments_check",
            GraphNode::ReportMerger => "report_merger",
            GraphNode::RefactorCode => "refactor_code",
            GraphNode::End => "end",
        }
    }
}

impl std::fmt::Display for GraphNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<AnalysisRoute> for GraphNode {
    fn from(route: AnalysisRoute) -> Self {
        match route {
            AnalysisRoute::Python => GraphNode::PythonCheck,
            AnalysisRoute::SqlPython => GraphNode::SqlPythonCheck,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisState {
    pub filename: String,
    language: Option<Language>,
    language_report: Option<ToolReport>,
    inline_report: Option<ToolReport>,
    merged_report: Option<MergedReport>,
    evaluation: Option<EvaluationReport>,
    visited: Vec<GraphNode>,
}

fn set_once<T>(slot: &mut Option<T>, value: T, field: &str, filename: &str) {
    if slot.is_some() {
        tracing::warn!(file = filename, field, "State slot already populated; ignoring write");
        return;
    }
    *slot = Some(value);
}

impl AnalysisState {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    pub fn language(&self) -> Option<&Language> {
        self.language.as_ref()
    }

    /// Report of the routed language-specific check
    pub fn language_report(&self) -> Option<&ToolReport> {
        self.language_report.as_ref()
    }

    pub fn inline_report(&self) -> Option<&ToolReport> {
        self.inline_report.as_ref()
    }

    pub fn merged_report(&self) -> Option<&MergedReport> {
        self.merged_report.as_ref()
    }

    pub fn evaluation(&self) -> Option<&EvaluationReport> {
        self.evaluation.as_ref()
    }

    pub fn visited(&self) -> &[GraphNode] {
        &self.visited
    }

    pub fn set_language(&mut self, language: Language) {
        set_once(&mut self.language, language, "language", &self.filename);
    }

    pub fn set_language_report(&mut self, report: ToolReport) {
        set_once(&mut self.language_report, report, "language_report", &self.filename);
    }

    pub fn set_inline_report(&mut self, report: ToolReport) {
        set_once(&mut self.inline_report, report, "inline_report", &self.filename);
    }

    pub fn set_merged_report(&mut self, report: MergedReport) {
        set_once(&mut self.merged_report, report, "merged_report", &self.filename);
    }

    pub fn set_evaluation(&mut self, report: EvaluationReport) {
        set_once(&mut self.evaluation, report, "evaluation", &self.filename);
    }

    pub fn record_visit(&mut self, node: GraphNode) {
        self.visited.push(node);
    }

    /// Consume the state, yielding the final evaluation.
    pub fn into_evaluation(self) -> Option<EvaluationReport> {
        self.evaluation
    }
}
