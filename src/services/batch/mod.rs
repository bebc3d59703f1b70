//! Batch Review
//!
//! Runs every file through every category, collects the rows and rolls
//! them up into the repository summary.

pub mod aggregator;
pub mod category;
pub mod collector;
pub mod runner;

pub use aggregator::Aggregator;
pub use category::CategoryReviewer;
pub use collector::ResultCollector;
pub use runner::BatchRunner;
