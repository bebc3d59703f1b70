//! Language Detection
//!
//! One generation call identifying the file's major language and any
//! embedded minor languages. The routing decision itself lives on
//! [`Language::route`].

use std::sync::Arc;

use review_cascade_core::{recover_or_default, Language, SourceFile};
use review_cascade_llm::TextGenerationClient;

use super::prompts;
use crate::utils::error::AppResult;

pub struct LanguageDetector {
    client: Arc<TextGenerationClient>,
}

impl LanguageDetector {
    pub fn new(client: Arc<TextGenerationClient>) -> Self {
        Self { client }
    }

    /// Detect the languages of `source`.
    ///
    /// An unparsable reply yields an empty `Language`, which routes as
    /// unsupported.
    pub async fn detect(&self, source: &SourceFile) -> AppResult<Language> {
        let prompt = prompts::language_detection(&source.numbered());
        let reply = self.client.generate(&prompt).await?;
        let language: Language = recover_or_default(&reply, "language_detection");
        tracing::info!(
            file = %source.name,
            major = %language.major_language,
            minor = ?language.minor_languages,
            "Detected language"
        );
        Ok(language)
    }
}
