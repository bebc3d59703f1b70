//! Scanner Errors

use thiserror::Error;

/// Failure of an external static-analysis tool.
///
/// All variants are fatal for the category that needed the tool.
#[derive(Error, Debug)]
pub enum ScannerError {
    /// The executable is not on PATH
    #[error("'{tool}' is not installed or not on PATH")]
    NotInstalled { tool: String },

    #[error("'{tool}' timed out after {seconds} seconds")]
    Timeout { tool: String, seconds: u64 },

    /// Exit code above the tool's failure threshold with diagnostics on stderr
    #[error("'{tool}' failed with exit code {exit_code}: {stderr}")]
    ToolFailure {
        tool: String,
        exit_code: i32,
        stderr: String,
    },

    /// Stdout was not the JSON document the tool documents
    #[error("'{tool}' produced unreadable output: {message}")]
    MalformedOutput { tool: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for scanner errors
pub type ScannerResult<T> = Result<T, ScannerError>;

impl ScannerError {
    pub fn malformed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedOutput {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
