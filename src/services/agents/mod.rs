//! Review Agents
//!
//! The analysis nodes of the review pipeline. Every node follows the same
//! shape: number the source lines, build a prompt, call the text-generation
//! client, extract and validate the JSON reply, then map it into core report
//! types. Malformed replies never escape a node; provider errors do.
//!
//! - `language` - major/minor language detection
//! - `code_style` - pylint scoring, SQL style check, inline comments
//! - `refactor` - refactor suggestions for merged issues
//! - `evaluation` - per-file narrative + refactor for finding-based categories
//! - `dry` - DRY and modularity review
//! - `security` - bandit, detect-secrets, risk scoring and input validation

pub mod code_style;
pub mod dry;
pub mod evaluation;
pub mod language;
pub mod prompts;
pub mod refactor;
pub mod security;
pub mod wire;

pub use code_style::{InlineCommentsCheck, PythonCheck, SqlPythonCheck};
pub use dry::DryModularityReviewer;
pub use language::LanguageDetector;
pub use refactor::RefactorNode;
pub use security::SecurityReviewer;

use review_cascade_core::{parse_payload, EvaluationDetail};

use wire::{validate_records, DetailWire};

/// Parse a reply holding a JSON array of findings.
///
/// A reply that is not an array at all yields no findings; individual
/// malformed findings are dropped.
pub(crate) fn parse_findings(reply: &str, context: &str) -> Vec<EvaluationDetail> {
    let values: Vec<serde_json::Value> = match parse_payload(reply) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!(context, error = %e, "Malformed findings response, treating as none");
            return Vec::new();
        }
    };
    validate_records::<DetailWire, EvaluationDetail>(values, context)
        .into_iter()
        .map(|d| d.annotate_unscored("model returned no usable score"))
        .collect()
}
