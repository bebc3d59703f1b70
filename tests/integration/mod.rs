//! Integration Tests
//!
//! End-to-end tests over the public API, driven by scripted model replies and
//! fixed scanner reports so no network or external tool is needed.

// Response extraction against adversarial model output
mod extraction_test;

// Code style graph: routing, merge and refactor on one file
mod code_style_graph_test;

// Full batch run: three categories, aggregation and the written report
mod pipeline_test;
