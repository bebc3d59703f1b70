//! Review Graph
//!
//! Per-file orchestration for the code-style category: analysis state,
//! report merge strategies and the graph executor.

pub mod code_style_graph;
pub mod merge;
pub mod state;

pub use code_style_graph::{next_node, CodeStyleGraph};
pub use merge::{coalesce_issues, merge_reports, LlmMerger, MechanicalMerger, ReportMerger};
pub use state::{AnalysisState, GraphNode};
