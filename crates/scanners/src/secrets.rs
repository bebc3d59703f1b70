//! Secrets Scanner
//!
//! Runs `detect-secrets scan` on a single file. Every hit is Critical.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;

use review_cascade_core::{Severity, SourceFile};

use crate::error::{ScannerError, ScannerResult};
use crate::models::{snippet_for, FindingSource, RawFinding, ScanReport, ScannerCommand};
use crate::runner::run_scanner;
use crate::StaticScanner;

pub struct SecretsScanner {
    command: ScannerCommand,
}

impl Default for SecretsScanner {
    fn default() -> Self {
        Self::new(Self::default_command())
    }
}

impl SecretsScanner {
    pub fn new(command: ScannerCommand) -> Self {
        Self { command }
    }

    pub fn default_command() -> ScannerCommand {
        ScannerCommand::new("detect-secrets")
            .with_args(["scan"])
            .with_failure_threshold(0)
    }
}

#[async_trait]
impl StaticScanner for SecretsScanner {
    fn source(&self) -> FindingSource {
        FindingSource::DetectSecrets
    }

    async fn scan(&self, file: &SourceFile) -> ScannerResult<ScanReport> {
        let output = run_scanner(&self.command, &file.path).await?;
        parse_secrets_output(&output.stdout, &file.content)
    }
}

#[derive(Debug, Deserialize)]
struct SecretsReport {
    #[serde(default)]
    results: BTreeMap<String, Vec<SecretHit>>,
}

#[derive(Debug, Deserialize)]
struct SecretHit {
    #[serde(rename = "type")]
    secret_type: String,
    line_number: u32,
}

pub fn parse_secrets_output(stdout: &str, content: &str) -> ScannerResult<ScanReport> {
    let report: SecretsReport = serde_json::from_str(stdout.trim())
        .map_err(|e| ScannerError::malformed("detect-secrets", e.to_string()))?;

    let mut findings: Vec<RawFinding> = report
        .results
        .into_values()
        .flatten()
        .map(|hit| {
            let line = hit.line_number.max(1);
            RawFinding {
                source: FindingSource::DetectSecrets,
                start_line: line,
                end_line: line,
                severity: Severity::Critical,
                snippet: snippet_for(content, line, line),
                message: format!("Potential hardcoded secret detected: {}", hit.secret_type),
                code: hit.secret_type,
            }
        })
        .collect();
    findings.sort_by_key(|f| f.start_line);

    Ok(ScanReport {
        findings,
        base_score: None,
    })
}
