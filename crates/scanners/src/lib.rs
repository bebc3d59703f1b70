//! Review Cascade Scanners
//!
//! External static-analysis tools used by the review categories. Each tool
//! runs as a child process against one file and reports JSON on stdout:
//!
//! - `pylint` - Python lint findings plus a quality score (code style)
//! - `bandit` - Python security findings (security)
//! - `detect-secrets` - hardcoded credentials (security)
//!
//! - `models` - Command definitions and normalized findings
//! - `runner` - Process execution with timeout and failure classification
//! - `fixed` - Canned-report scanner for tests and dry runs

pub mod bandit;
pub mod error;
pub mod fixed;
pub mod models;
pub mod pylint;
pub mod runner;
pub mod secrets;

use async_trait::async_trait;

use review_cascade_core::SourceFile;

pub use bandit::BanditScanner;
pub use error::{ScannerError, ScannerResult};
pub use fixed::FixedScanner;
pub use models::{
    FindingSource, RawFinding, ScanOutput, ScanReport, ScannerCommand, ScannerOverride,
};
pub use pylint::PylintScanner;
pub use runner::run_scanner;
pub use secrets::SecretsScanner;

/// A static-analysis tool that can scan one source file.
#[async_trait]
pub trait StaticScanner: Send + Sync {
    /// Which tool this is
    fn source(&self) -> FindingSource;

    /// Scan `file` and return its normalized findings.
    async fn scan(&self, file: &SourceFile) -> ScannerResult<ScanReport>;
}
