//! Core Error Types
//!
//! Defines the foundational error types used across the Review Cascade workspace.
//! These error types are dependency-free (only thiserror + std) to keep the core
//! crate lightweight.
//!
//! The main application crate wraps these together with LLM and scanner errors
//! in its own `AppError`.

use thiserror::Error;

/// Core error type for the Review Cascade workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The detected language has no analysis path
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The input file cannot be reviewed (extension, encoding, ...)
    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create an unsupported language error
    pub fn unsupported_language(language: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(language.into())
    }

    /// Create an unsupported file error
    pub fn unsupported_file(msg: impl Into<String>) -> Self {
        Self::UnsupportedFile(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
