//! Bandit Scanner
//!
//! Runs `bandit -f json` and maps each result to a finding with severity
//! LOW/MEDIUM/HIGH mapped to Minor/Moderate/Critical.

use async_trait::async_trait;
use serde::Deserialize;

use review_cascade_core::{Severity, SourceFile};

use crate::error::{ScannerError, ScannerResult};
use crate::models::{snippet_for, FindingSource, RawFinding, ScanReport, ScannerCommand};
use crate::runner::run_scanner;
use crate::StaticScanner;

pub struct BanditScanner {
    command: ScannerCommand,
}

impl Default for BanditScanner {
    fn default() -> Self {
        Self::new(Self::default_command())
    }
}

impl BanditScanner {
    pub fn new(command: ScannerCommand) -> Self {
        Self { command }
    }

    /// Bandit exits 1 when it reports issues.
    pub fn default_command() -> ScannerCommand {
        ScannerCommand::new("bandit")
            .with_args(["-f", "json", "-q"])
            .with_failure_threshold(1)
    }
}

#[async_trait]
impl StaticScanner for BanditScanner {
    fn source(&self) -> FindingSource {
        FindingSource::Bandit
    }

    async fn scan(&self, file: &SourceFile) -> ScannerResult<ScanReport> {
        let output = run_scanner(&self.command, &file.path).await?;
        parse_bandit_output(&output.stdout, &file.content)
    }
}

pub fn severity_for_level(level: &str) -> Severity {
    match level.trim().to_ascii_uppercase().as_str() {
        "HIGH" => Severity::Critical,
        "MEDIUM" => Severity::Moderate,
        _ => Severity::Minor,
    }
}

#[derive(Debug, Deserialize)]
struct BanditReport {
    #[serde(default)]
    results: Vec<BanditResult>,
}

#[derive(Debug, Deserialize)]
struct BanditResult {
    issue_severity: String,
    issue_text: String,
    line_number: u32,
    #[serde(default)]
    line_range: Vec<u32>,
    #[serde(default)]
    test_id: String,
    #[serde(default)]
    test_name: String,
}

pub fn parse_bandit_output(stdout: &str, content: &str) -> ScannerResult<ScanReport> {
    let report: BanditReport = serde_json::from_str(stdout.trim())
        .map_err(|e| ScannerError::malformed("bandit", e.to_string()))?;

    let findings = report
        .results
        .into_iter()
        .map(|r| {
            let start_line = r
                .line_range
                .iter()
                .copied()
                .min()
                .unwrap_or(r.line_number)
                .max(1);
            let end_line = r
                .line_range
                .iter()
                .copied()
                .max()
                .unwrap_or(r.line_number)
                .max(start_line);
            RawFinding {
                source: FindingSource::Bandit,
                start_line,
                end_line,
                severity: severity_for_level(&r.issue_severity),
                snippet: snippet_for(content, start_line, end_line),
                message: if r.test_name.is_empty() {
                    r.issue_text
                } else {
                    format!("{} ({})", r.issue_text, r.test_name)
                },
                code: r.test_id,
            }
        })
        .collect();

    Ok(ScanReport {
        findings,
        base_score: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_levels() {
        assert_eq!(severity_for_level("HIGH"), Severity::Critical);
        assert_eq!(severity_for_level("medium"), Severity::Moderate);
        assert_eq!(severity_for_level("LOW"), Severity::Minor);
        assert_eq!(severity_for_level("UNDEFINED"), Severity::Minor);
    }

    #[test]
    fn test_parse_results() {
        let stdout = r#"{
            "errors": [],
            "metrics": {},
            "results": [
                {"code": "2 password = 'hunter2'\n", "filename": "app.py", "issue_confidence": "MEDIUM",
                 "issue_severity": "LOW", "issue_text": "Possible hardcoded password: 'hunter2'",
                 "line_number": 2, "line_range": [2], "test_id": "B105", "test_name": "hardcoded_password_string"},
                {"code": "4 subprocess.call(cmd, shell=True)\n", "filename": "app.py", "issue_confidence": "HIGH",
                 "issue_severity": "HIGH", "issue_text": "subprocess call with shell=True identified",
                 "line_number": 4, "line_range": [4, 5], "test_id": "B602", "test_name": "subprocess_popen_with_shell_equals_true"}
            ]
        }"#;
        let content = "import subprocess\npassword = 'hunter2'\ncmd = input()\nsubprocess.call(cmd,\n    shell=True)\n";
        let report = parse_bandit_output(stdout, content).unwrap();

        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.base_score, None);
        assert_eq!(report.findings[0].severity, Severity::Minor);
        assert_eq!(report.findings[0].code, "B105");
        assert_eq!(report.findings[0].snippet, "password = 'hunter2'");
        assert_eq!(report.findings[1].severity, Severity::Critical);
        assert_eq!(
            (report.findings[1].start_line, report.findings[1].end_line),
            (4, 5)
        );
    }

    #[test]
    fn test_no_results() {
        let report = parse_bandit_output(r#"{"errors": [], "results": []}"#, "").unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn test_malformed() {
        assert!(parse_bandit_output("Run started", "").is_err());
    }
}
