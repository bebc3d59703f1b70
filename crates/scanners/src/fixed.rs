//! Fixed Scanner
//!
//! A [`StaticScanner`] that returns a canned report instead of spawning a
//! process. Used by tests and dry runs on machines without the tools.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use review_cascade_core::SourceFile;

use crate::error::{ScannerError, ScannerResult};
use crate::models::{FindingSource, RawFinding, ScanReport};
use crate::StaticScanner;

pub struct FixedScanner {
    source: FindingSource,
    outcome: Result<ScanReport, String>,
    scans: AtomicUsize,
}

impl FixedScanner {
    pub fn new(source: FindingSource, report: ScanReport) -> Self {
        Self {
            source,
            outcome: Ok(report),
            scans: AtomicUsize::new(0),
        }
    }

    pub fn with_findings(source: FindingSource, findings: Vec<RawFinding>) -> Self {
        Self::new(
            source,
            ScanReport {
                findings,
                base_score: None,
            },
        )
    }

    pub fn clean(source: FindingSource) -> Self {
        Self::new(source, ScanReport::default())
    }

    /// Every scan fails with a `ToolFailure` carrying `stderr`.
    pub fn failing(source: FindingSource, stderr: impl Into<String>) -> Self {
        Self {
            source,
            outcome: Err(stderr.into()),
            scans: AtomicUsize::new(0),
        }
    }

    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StaticScanner for FixedScanner {
    fn source(&self) -> FindingSource {
        self.source
    }

    async fn scan(&self, _file: &SourceFile) -> ScannerResult<ScanReport> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(report) => Ok(report.clone()),
            Err(stderr) => Err(ScannerError::ToolFailure {
                tool: self.source.display_name().to_string(),
                exit_code: 2,
                stderr: stderr.clone(),
            }),
        }
    }
}
