//! Data Models
//!
//! Report rows and artifacts produced by a review run. Per-file review
//! types live in the core crate.

pub mod review;

pub use review::*;
