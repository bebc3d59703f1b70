//! Scanner Models
//!
//! Command definitions and normalized findings for the external
//! static-analysis tools.

use serde::{Deserialize, Serialize};

use review_cascade_core::Severity;

/// Tool a finding came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingSource {
    Pylint,
    Bandit,
    DetectSecrets,
}

impl FindingSource {
    pub fn display_name(&self) -> &'static str {
        match self {
            FindingSource::Pylint => "pylint",
            FindingSource::Bandit => "bandit",
            FindingSource::DetectSecrets => "detect-secrets",
        }
    }
}

impl std::fmt::Display for FindingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// How to invoke one scanner. The file path is appended as the last argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerCommand {
    /// Executable name or path
    pub command: String,
    /// Arguments placed before the file path
    pub args: Vec<String>,
    /// Timeout in seconds
    pub timeout_secs: u64,
    /// Exit codes above this, together with non-empty stderr, are failures
    pub failure_exit_threshold: i32,
    /// Maximum output size to capture (bytes)
    pub max_output_size: usize,
}

impl ScannerCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            timeout_secs: 120,
            failure_exit_threshold: 0,
            max_output_size: 4 * 1024 * 1024,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_failure_threshold(mut self, threshold: i32) -> Self {
        self.failure_exit_threshold = threshold;
        self
    }
}

/// User-facing override for one scanner (config file section)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerOverride {
    /// Executable override, e.g. a virtualenv path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ScannerOverride {
    pub fn apply(&self, mut command: ScannerCommand) -> ScannerCommand {
        if let Some(cmd) = &self.command {
            command.command = cmd.clone();
        }
        if let Some(secs) = self.timeout_secs {
            command.timeout_secs = secs;
        }
        command
    }
}

/// Captured process output
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl ScanOutput {
    pub fn is_tool_failure(&self, threshold: i32) -> bool {
        self.exit_code > threshold && !self.stderr.trim().is_empty()
    }
}

/// One pre-classified finding from a scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFinding {
    pub source: FindingSource,
    pub start_line: u32,
    pub end_line: u32,
    pub severity: Severity,
    /// Tool rule identifier (pylint message id, bandit test id, secret type)
    pub code: String,
    /// Source text of the flagged lines
    pub snippet: String,
    pub message: String,
}

/// Everything one scanner reported for one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub findings: Vec<RawFinding>,
    /// Tool-provided quality score on the 0-8 scale, when the tool has one
    pub base_score: Option<f64>,
}

impl ScanReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Source text of lines `start..=end` (1-based), clamped to the file.
pub fn snippet_for(content: &str, start: u32, end: u32) -> String {
    let start = start.max(1) as usize;
    let end = (end.max(start as u32)) as usize;
    content
        .lines()
        .skip(start - 1)
        .take(end - start + 1)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failure_needs_stderr() {
        let out = ScanOutput {
            exit_code: 2,
            stdout: String::new(),
            stderr: "  ".to_string(),
            duration_ms: 1,
        };
        assert!(!out.is_tool_failure(1));
        let out = ScanOutput {
            stderr: "usage: bandit".to_string(),
            ..out
        };
        assert!(out.is_tool_failure(1));
        assert!(!out.is_tool_failure(2));
    }

    #[test]
    fn test_snippet_for() {
        let content = "a\nb\nc\nd";
        assert_eq!(snippet_for(content, 2, 3), "b\nc");
        assert_eq!(snippet_for(content, 4, 1), "d");
        assert_eq!(snippet_for(content, 9, 9), "");
    }

    #[test]
    fn test_override_apply() {
        let cmd = ScannerCommand::new("pylint").with_timeout_secs(10);
        let cmd = ScannerOverride {
            command: Some("/venv/bin/pylint".to_string()),
            timeout_secs: None,
        }
        .apply(cmd);
        assert_eq!(cmd.command, "/venv/bin/pylint");
        assert_eq!(cmd.timeout_secs, 10);
    }
}
