//! Pylint Scanner
//!
//! Runs `pylint --output-format=json2` and maps each message to a finding.
//! Severity comes from the first letter of the message id:
//! F/E are Critical, C is Moderate, W/R/I are Minor.

use async_trait::async_trait;
use serde::Deserialize;

use review_cascade_core::{Severity, SourceFile, MAX_SCORE};

use crate::error::{ScannerError, ScannerResult};
use crate::models::{snippet_for, FindingSource, RawFinding, ScanReport, ScannerCommand};
use crate::runner::run_scanner;
use crate::StaticScanner;

/// Checks disabled for review runs: line length, import resolution and
/// trailing whitespace/newline noise.
pub const DISABLED_CHECKS: &str = "C0301,E0401,C0303,C0304";

/// Pylint exit codes are bit flags; 32 marks a usage error.
const USAGE_ERROR_THRESHOLD: i32 = 31;

pub struct PylintScanner {
    command: ScannerCommand,
}

impl Default for PylintScanner {
    fn default() -> Self {
        Self::new(Self::default_command())
    }
}

impl PylintScanner {
    pub fn new(command: ScannerCommand) -> Self {
        Self { command }
    }

    pub fn default_command() -> ScannerCommand {
        ScannerCommand::new("pylint")
            .with_args([
                "--output-format=json2".to_string(),
                format!("--disable={}", DISABLED_CHECKS),
            ])
            .with_failure_threshold(USAGE_ERROR_THRESHOLD)
    }
}

#[async_trait]
impl StaticScanner for PylintScanner {
    fn source(&self) -> FindingSource {
        FindingSource::Pylint
    }

    async fn scan(&self, file: &SourceFile) -> ScannerResult<ScanReport> {
        let output = run_scanner(&self.command, &file.path).await?;
        parse_pylint_output(&output.stdout, &file.content)
    }
}

/// Severity for a pylint message id such as `C0114`.
pub fn severity_for_message_id(message_id: &str) -> Severity {
    match message_id.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('F') | Some('E') => Severity::Critical,
        Some('C') => Severity::Moderate,
        _ => Severity::Minor,
    }
}

#[derive(Debug, Deserialize)]
struct Json2Report {
    #[serde(default)]
    messages: Vec<Json2Message>,
    statistics: Option<Json2Statistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json2Message {
    message_id: String,
    #[serde(default)]
    symbol: String,
    message: String,
    line: u32,
    end_line: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Json2Statistics {
    score: Option<f64>,
}

/// Parse json2 output; the 10-point pylint note is rescaled to 8 points.
pub fn parse_pylint_output(stdout: &str, content: &str) -> ScannerResult<ScanReport> {
    let report: Json2Report = serde_json::from_str(stdout.trim())
        .map_err(|e| ScannerError::malformed("pylint", e.to_string()))?;

    let findings = report
        .messages
        .into_iter()
        .map(|m| {
            let start_line = m.line.max(1);
            let end_line = m.end_line.unwrap_or(start_line).max(start_line);
            RawFinding {
                source: FindingSource::Pylint,
                start_line,
                end_line,
                severity: severity_for_message_id(&m.message_id),
                snippet: snippet_for(content, start_line, end_line),
                message: format!("{} ({}): {}", m.message_id, m.symbol, m.message),
                code: m.message_id,
            }
        })
        .collect();

    let base_score = report
        .statistics
        .and_then(|s| s.score)
        .map(|score| (score / 10.0 * MAX_SCORE).clamp(0.0, MAX_SCORE));
    if base_score.is_none() {
        tracing::warn!("pylint output carried no score");
    }

    Ok(ScanReport {
        findings,
        base_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "messages": [
            {"type": "convention", "symbol": "missing-module-docstring", "message": "Missing module docstring",
             "messageId": "C0114", "confidence": "HIGH", "module": "job", "obj": "", "line": 1, "column": 0,
             "endLine": null, "endColumn": null, "path": "job.py", "absolutePath": "/tmp/job.py"},
            {"type": "error", "symbol": "undefined-variable", "message": "Undefined variable 'y'",
             "messageId": "E0602", "confidence": "UNDEFINED", "module": "job", "obj": "f", "line": 3, "column": 11,
             "endLine": 4, "endColumn": 12, "path": "job.py", "absolutePath": "/tmp/job.py"}
        ],
        "statistics": {"messageTypeCount": {"fatal": 0, "error": 1}, "modulesLinted": 1, "score": 5.0}
    }"#;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(severity_for_message_id("F0001"), Severity::Critical);
        assert_eq!(severity_for_message_id("E1101"), Severity::Critical);
        assert_eq!(severity_for_message_id("C0103"), Severity::Moderate);
        assert_eq!(severity_for_message_id("W0611"), Severity::Minor);
        assert_eq!(severity_for_message_id("R1705"), Severity::Minor);
        assert_eq!(severity_for_message_id("I1101"), Severity::Minor);
    }

    #[test]
    fn test_parse_json2() {
        let content = "import os\ndef f():\n    return y\n    pass\n";
        let report = parse_pylint_output(SAMPLE, content).unwrap();

        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.base_score, Some(4.0));

        let first = &report.findings[0];
        assert_eq!((first.start_line, first.end_line), (1, 1));
        assert_eq!(first.severity, Severity::Moderate);
        assert_eq!(first.snippet, "import os");
        assert!(first.message.starts_with("C0114 (missing-module-docstring)"));

        let second = &report.findings[1];
        assert_eq!((second.start_line, second.end_line), (3, 4));
        assert_eq!(second.severity, Severity::Critical);
        assert_eq!(second.snippet, "    return y\n    pass");
    }

    #[test]
    fn test_clean_file() {
        let report =
            parse_pylint_output(r#"{"messages": [], "statistics": {"score": 10.0}}"#, "").unwrap();
        assert!(report.is_clean());
        assert_eq!(report.base_score, Some(8.0));
    }

    #[test]
    fn test_malformed_output() {
        let err = parse_pylint_output("************* Module job", "").unwrap_err();
        assert!(matches!(err, ScannerError::MalformedOutput { .. }));
    }

    #[test]
    fn test_default_command_disables_noise() {
        let cmd = PylintScanner::default_command();
        assert!(cmd.args.contains(&"--output-format=json2".to_string()));
        assert!(cmd.args.contains(&"--disable=C0301,E0401,C0303,C0304".to_string()));
        assert_eq!(cmd.failure_exit_threshold, 31);
    }
}
