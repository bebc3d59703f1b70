//! Services
//!
//! Review logic layered on top of the core, llm and scanners crates.

pub mod agents;
pub mod batch;
pub mod graph;
pub mod pipeline;
pub mod report;

pub use pipeline::{ReviewPipeline, RunSummary, Scanners};
