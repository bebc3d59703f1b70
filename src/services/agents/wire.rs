//! Response Wire Formats
//!
//! Strict serde records for every JSON shape a prompt asks for, plus the
//! domain validation that turns them into core types. Whole-payload failures
//! degrade to defaults at the calling node; individual records that fail
//! validation are dropped with a warning.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use review_cascade_core::extract::lenient;
use review_cascade_core::{EvaluationDetail, Issue, Severity, MAX_SCORE, UNSCORED};

/// Validate each raw record, dropping the ones that do not fit.
pub fn validate_records<W, D>(values: Vec<serde_json::Value>, context: &str) -> Vec<D>
where
    W: DeserializeOwned,
    D: TryFrom<W, Error = String>,
{
    values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| {
            let record = serde_json::from_value::<W>(value)
                .map_err(|e| e.to_string())
                .and_then(D::try_from);
            match record {
                Ok(record) => Some(record),
                Err(reason) => {
                    tracing::warn!(context, index = idx, %reason, "Dropping invalid record");
                    None
                }
            }
        })
        .collect()
}

fn check_score(score: f64) -> Result<f64, String> {
    if (0.0..=MAX_SCORE).contains(&score) {
        Ok(score)
    } else {
        Err(format!("score {} outside 0-{}", score, MAX_SCORE))
    }
}

fn check_severity(label: &str) -> Result<Severity, String> {
    Severity::from_label(label).ok_or_else(|| format!("unknown severity '{}'", label))
}

// ============================================================================
// Issues (SQL style check, merge output)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct IssueWire {
    #[serde(deserialize_with = "lenient::number")]
    pub score: f64,
    pub severity: String,
    #[serde(alias = "start_line_number", deserialize_with = "lenient::line")]
    pub start_line: u32,
    #[serde(alias = "end_line_number", deserialize_with = "lenient::line")]
    pub end_line: u32,
    #[serde(alias = "issue_description", alias = "issue")]
    pub description: String,
}

impl TryFrom<IssueWire> for Issue {
    type Error = String;

    fn try_from(wire: IssueWire) -> Result<Self, Self::Error> {
        Ok(Issue::new(
            wire.start_line,
            wire.end_line,
            check_severity(&wire.severity)?,
            check_score(wire.score)?,
            wire.description,
        ))
    }
}

/// `{violations, base_score, issues[]}`
#[derive(Debug, Default, Deserialize)]
pub struct StyleReportWire {
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub violations: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub base_score: Option<f64>,
    #[serde(default)]
    pub issues: Vec<serde_json::Value>,
}

/// `{"report": [...]}` used by both the inline-comment check and the merge.
#[derive(Debug, Default, Deserialize)]
pub struct ReportListWire {
    #[serde(default)]
    pub report: Vec<serde_json::Value>,
}

// ============================================================================
// Inline comments
// ============================================================================

/// Score and severity every inline-comment issue carries.
pub const INLINE_COMMENT_SCORE: f64 = 8.0;

#[derive(Debug, Deserialize)]
pub struct InlineIssueWire {
    #[serde(alias = "start_line", deserialize_with = "lenient::line")]
    pub start_line_number: u32,
    #[serde(alias = "end_line", deserialize_with = "lenient::line")]
    pub end_line_number: u32,
    #[serde(alias = "description")]
    pub issue: String,
}

/// Newtype so the inline mapping can use `validate_records`.
pub struct InlineIssue(pub Issue);

impl TryFrom<InlineIssueWire> for InlineIssue {
    type Error = String;

    fn try_from(wire: InlineIssueWire) -> Result<Self, Self::Error> {
        if wire.issue.trim().is_empty() {
            return Err("empty issue text".to_string());
        }
        Ok(InlineIssue(Issue::new(
            wire.start_line_number,
            wire.end_line_number,
            Severity::Minor,
            INLINE_COMMENT_SCORE,
            wire.issue,
        )))
    }
}

// ============================================================================
// Lint scoring
// ============================================================================

/// `{"score": [...]}`, one entry per finding
#[derive(Debug, Default, Deserialize)]
pub struct ScoreListWire {
    #[serde(default)]
    pub score: Vec<serde_json::Value>,
}

impl ScoreListWire {
    /// Score for finding `idx`, or [`UNSCORED`] when missing or invalid.
    pub fn score_at(&self, idx: usize) -> f64 {
        self.score
            .get(idx)
            .and_then(|v| match v {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            })
            .and_then(|s| check_score(s).ok())
            .unwrap_or(UNSCORED)
    }
}

/// `{"risk_score": n}`
#[derive(Debug, Deserialize)]
pub struct RiskScoreWire {
    #[serde(deserialize_with = "lenient::number")]
    pub risk_score: f64,
}

impl RiskScoreWire {
    pub fn validated(&self) -> Result<f64, String> {
        check_score(self.risk_score)
    }
}

// ============================================================================
// Findings and evaluation details
// ============================================================================

/// One finding or refactored detail. Accepts the snippet field names the
/// different prompts use.
#[derive(Debug, Deserialize)]
pub struct DetailWire {
    #[serde(alias = "start_line", deserialize_with = "lenient::line")]
    pub start_line_number: u32,
    #[serde(alias = "end_line", deserialize_with = "lenient::line")]
    pub end_line_number: u32,
    #[serde(
        default,
        alias = "original_python_script",
        alias = "original_sql_script",
        alias = "original_snippet"
    )]
    pub original_code_snippet: String,
    #[serde(
        default,
        alias = "refactored_python_script",
        alias = "refactored_sql_script",
        alias = "refactored_snippet"
    )]
    pub refactored_code_snippet: Option<String>,
    #[serde(alias = "issue", alias = "description")]
    pub issue_summary: String,
    pub severity: String,
    #[serde(deserialize_with = "lenient::number")]
    pub score: f64,
}

impl TryFrom<DetailWire> for EvaluationDetail {
    type Error = String;

    /// Shape validation only; a negative score is kept as the sentinel.
    fn try_from(wire: DetailWire) -> Result<Self, Self::Error> {
        let score = if wire.score < 0.0 {
            UNSCORED
        } else {
            check_score(wire.score)?
        };
        Ok(EvaluationDetail {
            start_line: wire.start_line_number,
            end_line: wire.end_line_number,
            original_snippet: wire.original_code_snippet,
            refactored_snippet: wire
                .refactored_code_snippet
                .filter(|s| !s.trim().is_empty()),
            issue_summary: wire.issue_summary,
            severity: check_severity(&wire.severity)?,
            score,
            score_error: None,
        })
    }
}

/// Refactor node output
#[derive(Debug, Deserialize)]
pub struct RefactorWire {
    #[serde(default)]
    pub overall_issue_summary: String,
    #[serde(default)]
    pub overall_refactor_summary: String,
    pub evaluation_details: Vec<serde_json::Value>,
}

/// Per-file narrative
#[derive(Debug, Deserialize)]
pub struct SummaryWire {
    pub evaluation_issue_summary: String,
    pub evaluation_refactor_summary: String,
}
