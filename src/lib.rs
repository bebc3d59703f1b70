//! Review Cascade - Rust Backend Library
//!
//! LLM-orchestrated review of Python and SQL files across three categories
//! (code style, DRY/modularity, security). It includes:
//! - Analysis agents backed by a text-generation service and external scanners
//! - The per-file code-style graph and its merge strategies
//! - Batch running, aggregation and JSON report output
//! - Layered configuration and error types

pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{ConfigOverrides, MergeStrategy, ReviewConfig};
pub use models::review::{FileOutcome, ReviewCategory, ReviewReport};
pub use services::{ReviewPipeline, RunSummary, Scanners};
pub use utils::error::{AppError, AppResult};
