//! Review Cascade Core
//!
//! Foundational data model, error types and response-extraction helpers for
//! the Review Cascade workspace. This crate has zero dependencies on
//! application-level code (LLM providers, scanners, the review graph).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `models` - Issues, tool/merged/evaluation reports, language routing
//! - `extract` - JSON extraction from free-form model output
//! - `source` - Source file loading and line-number annotation
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/thiserror/tracing** - keeps build times minimal
//! 2. **Pure data and pure functions** - every type here is testable without I/O mocks
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod error;
pub mod extract;
pub mod models;
pub mod source;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Extraction ─────────────────────────────────────────────────────────
pub use extract::{
    extract_json_array, extract_json_block, parse_payload, recover_or_default,
    strip_code_fences, ExtractError,
};

// ── Review Model ───────────────────────────────────────────────────────
pub use models::{
    mean, AnalysisRoute, EvaluationDetail, EvaluationReport, Issue, Language, MergedReport,
    Severity, ToolReport, MAX_SCORE, UNSCORED,
};

// ── Sources ────────────────────────────────────────────────────────────
pub use source::{number_lines, parse_line_prefix, strip_line_numbers, SourceFile, SourceKind};
