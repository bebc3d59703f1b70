//! Review Cascade LLM
//!
//! Provides the text-generation side of the review pipeline:
//! - `LlmProvider`, the provider abstraction
//! - `OpenAIProvider`, for OpenAI-compatible chat endpoints (OpenAI, Groq)
//! - `TextGenerationClient`, the rate-limit aware `prompt -> text` client
//! - `ScriptedProvider`, an in-memory provider for tests and dry runs
//!
//! Also includes the HTTP client factory.

pub mod client;
pub mod http_client;
pub mod openai;
pub mod provider;
pub mod scripted;
pub mod types;

// Re-export main types
pub use client::{RetryPolicy, TextGenerationClient};
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use scripted::ScriptedProvider;
pub use types::*;

pub use tokio_util::sync::CancellationToken;
