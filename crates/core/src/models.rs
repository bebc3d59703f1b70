//! Review Models
//!
//! Data structures shared by every review category: issues, tool reports,
//! merged reports, evaluation reports and the detected file language.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Score carried by a finding whose scoring step failed.
///
/// Aggregation excludes negative scores.
pub const UNSCORED: f64 = -1.0;

/// Highest score an issue can carry (a fully compliant snippet).
pub const MAX_SCORE: f64 = 8.0;

/// Arithmetic mean of the given values, `None` when there are none.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

// ============================================================================
// Severity
// ============================================================================

/// Issue severity, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Moderate,
    Minor,
}

impl Severity {
    /// Numeric rank, higher is more severe.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Critical => 3,
            Severity::Moderate => 2,
            Severity::Minor => 1,
        }
    }

    /// The more severe of the two.
    pub fn most_severe(self, other: Severity) -> Severity {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }

    /// Advisory score band for this severity. Not enforced anywhere.
    pub fn band(self) -> RangeInclusive<f64> {
        match self {
            Severity::Critical => 0.0..=2.0,
            Severity::Moderate => 3.0..=5.0,
            Severity::Minor => 6.0..=MAX_SCORE,
        }
    }

    /// Case-insensitive parse of a model or tool label.
    pub fn from_label(label: &str) -> Option<Severity> {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "moderate" => Some(Severity::Moderate),
            "minor" => Some(Severity::Minor),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Moderate => "Moderate",
            Severity::Minor => "Minor",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::from_label(s)
            .ok_or_else(|| CoreError::validation(format!("unknown severity '{}'", s)))
    }
}

// ============================================================================
// Issues and reports
// ============================================================================

/// A single finding on a line span of one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Score in `[0, 8]`, or [`UNSCORED`]
    pub score: f64,
    pub severity: Severity,
    /// 1-based, inclusive
    pub start_line: u32,
    /// 1-based, inclusive. Expected `>= start_line` but not enforced.
    pub end_line: u32,
    pub description: String,
}

impl Issue {
    pub fn new(
        start_line: u32,
        end_line: u32,
        severity: Severity,
        score: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            score,
            severity,
            start_line,
            end_line,
            description: description.into(),
        }
    }

    /// Line span used as the merge key.
    pub fn span(&self) -> (u32, u32) {
        (self.start_line, self.end_line)
    }

    pub fn is_scored(&self) -> bool {
        self.score >= 0.0
    }

    /// Whether the score falls inside the advisory band of its severity.
    pub fn within_band(&self) -> bool {
        self.severity.band().contains(&self.score)
    }
}

/// Output of one analysis step for one file. Never mutated once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolReport {
    pub issues: Vec<Issue>,
    /// Count reported by the analysis step; may disagree with `issues.len()`.
    pub violation_count: usize,
    /// `None` when the step could not produce a base score.
    pub base_score: Option<f64>,
}

impl ToolReport {
    pub fn new(issues: Vec<Issue>, violation_count: usize, base_score: Option<f64>) -> Self {
        Self {
            issues,
            violation_count,
            base_score,
        }
    }

    /// Report built from issues alone: count taken from the list.
    pub fn from_issues(issues: Vec<Issue>, base_score: Option<f64>) -> Self {
        let violation_count = issues.len();
        Self::new(issues, violation_count, base_score)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn recomputed_count(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Deduplicated union of two tool reports for the same file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedReport {
    pub issues: Vec<Issue>,
    /// Always `issues.len()`
    pub violation_count: usize,
    /// Mean of the defined input base scores
    pub base_score: Option<f64>,
}

impl MergedReport {
    pub fn new(issues: Vec<Issue>, base_score: Option<f64>) -> Self {
        Self {
            violation_count: issues.len(),
            issues,
            base_score,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<MergedReport> for ToolReport {
    fn from(merged: MergedReport) -> Self {
        ToolReport::new(merged.issues, merged.violation_count, merged.base_score)
    }
}

/// A merged issue enriched with before/after refactor snippets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDetail {
    pub start_line: u32,
    pub end_line: u32,
    pub original_snippet: String,
    pub refactored_snippet: Option<String>,
    pub issue_summary: String,
    pub severity: Severity,
    pub score: f64,
    /// Set when the score could not be assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_error: Option<String>,
}

impl EvaluationDetail {
    pub fn is_scored(&self) -> bool {
        self.score >= 0.0
    }

    /// Attach a `score_error` annotation when the score is the sentinel.
    pub fn annotate_unscored(mut self, reason: impl Into<String>) -> Self {
        if !self.is_scored() && self.score_error.is_none() {
            self.score_error = Some(reason.into());
        }
        self
    }
}

/// Final per-file, per-category review result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub violation_count: usize,
    /// Mean of the scored details, `None` when there are none
    pub evaluation_score: Option<f64>,
    pub issue_summary: String,
    pub refactor_summary: String,
    pub details: Vec<EvaluationDetail>,
}

impl EvaluationReport {
    /// Build a report from its details; count and score are derived.
    pub fn from_details(
        issue_summary: impl Into<String>,
        refactor_summary: impl Into<String>,
        details: Vec<EvaluationDetail>,
    ) -> Self {
        Self {
            violation_count: details.len(),
            evaluation_score: Self::mean_score(&details),
            issue_summary: issue_summary.into(),
            refactor_summary: refactor_summary.into(),
            details,
        }
    }

    /// Mean score over details that carry a real score.
    pub fn mean_score(details: &[EvaluationDetail]) -> Option<f64> {
        mean(details.iter().filter(|d| d.is_scored()).map(|d| d.score))
    }
}

// ============================================================================
// Language routing
// ============================================================================

/// Languages detected in a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub major_language: String,
    #[serde(default)]
    pub minor_languages: Vec<String>,
}

/// Analysis branch chosen for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisRoute {
    /// Lint-tool based Python check
    Python,
    /// Generation-only check for SQL or Python embedding SQL
    SqlPython,
}

impl Language {
    pub fn new(major: impl Into<String>, minor: Vec<String>) -> Self {
        Self {
            major_language: major.into(),
            minor_languages: minor,
        }
    }

    fn is(name: &str, expected: &str) -> bool {
        name.trim().eq_ignore_ascii_case(expected)
    }

    pub fn has_minor(&self, expected: &str) -> bool {
        self.minor_languages.iter().any(|l| Self::is(l, expected))
    }

    /// Pure routing decision.
    ///
    /// SQL, or Python embedding SQL, goes to the SQL path; plain Python to the
    /// lint path; anything else is unsupported.
    pub fn route(&self) -> CoreResult<AnalysisRoute> {
        if Self::is(&self.major_language, "sql") {
            Ok(AnalysisRoute::SqlPython)
        } else if Self::is(&self.major_language, "python") {
            if self.has_minor("sql") {
                Ok(AnalysisRoute::SqlPython)
            } else {
                Ok(AnalysisRoute::Python)
            }
        } else {
            Err(CoreError::unsupported_language(
                self.major_language.trim().to_string(),
            ))
        }
    }
}
