//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use review_cascade_core::CoreError;
use review_cascade_llm::LlmError;
use review_cascade_scanners::ScannerError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Text-generation errors that survived the client's retry policy
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// External static-analysis tool errors
    #[error("Scanner error: {0}")]
    Scanner(#[from] ScannerError),

    /// Data model and source loading errors
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The run was cancelled
    #[error("Review cancelled")]
    Cancelled,

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error rules out every remaining category of the file.
    pub fn is_unsupported_input(&self) -> bool {
        matches!(self, AppError::Core(CoreError::UnsupportedLanguage(_)))
    }

    /// Whether this error means the whole run must stop.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled | AppError::Llm(LlmError::Cancelled))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Convert AppError to a string suitable for report outcome rows
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
