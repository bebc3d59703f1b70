//! Review Configuration
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables, then command-line overrides.
//!
//! ```toml
//! output_dir = "ai_code_review_reports"
//! merge_strategy = "llm"
//!
//! [llm]
//! provider = "groq"
//! model = "openai/gpt-oss-120b"
//! temperature = 0.01
//!
//! [retry]
//! cooldown_secs = 60
//!
//! [scanners.pylint]
//! command = ".venv/bin/pylint"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use review_cascade_llm::{ProviderConfig, RetryPolicy};
use review_cascade_scanners::ScannerOverride;

use crate::utils::error::{AppError, AppResult};

/// Environment variable checked first for the API key
pub const API_KEY_ENV: &str = "REVIEW_CASCADE_API_KEY";
/// Environment variable overriding the model name
pub const MODEL_ENV: &str = "REVIEW_CASCADE_MODEL";

/// How the code-style merge step coalesces the two reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Ask the model to coalesce, fall back to the mechanical merge
    #[default]
    Llm,
    /// Deterministic span-based merge only
    Mechanical,
}

impl std::str::FromStr for MergeStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(MergeStrategy::Llm),
            "mechanical" => Ok(MergeStrategy::Mechanical),
            other => Err(AppError::config(format!(
                "unknown merge strategy '{}' (expected 'llm' or 'mechanical')",
                other
            ))),
        }
    }
}

/// Per-tool scanner overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerSettings {
    #[serde(default)]
    pub pylint: ScannerOverride,
    #[serde(default)]
    pub bandit: ScannerOverride,
    #[serde(default, rename = "detect-secrets", alias = "detect_secrets")]
    pub detect_secrets: ScannerOverride,
}

/// Complete review configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default)]
    pub llm: ProviderConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub scanners: ScannerSettings,
    #[serde(default)]
    pub merge_strategy: MergeStrategy,
    /// Directory the JSON report is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("ai_code_review_reports")
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            llm: ProviderConfig::default(),
            retry: RetryPolicy::default(),
            scanners: ScannerSettings::default(),
            merge_strategy: MergeStrategy::default(),
            output_dir: default_output_dir(),
        }
    }
}

/// Command-line overrides (partial update)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub output_dir: Option<PathBuf>,
    pub merge_strategy: Option<MergeStrategy>,
    pub model: Option<String>,
    pub cooldown_secs: Option<u64>,
    pub max_attempts: Option<u32>,
}

impl ReviewConfig {
    /// Load defaults, the optional TOML file and the process environment.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    AppError::config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> AppResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply environment overrides through `lookup` (testable without
    /// touching the process environment).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) =
            non_empty(API_KEY_ENV).or_else(|| non_empty(self.llm.provider.api_key_env()))
        {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = non_empty(MODEL_ENV) {
            self.llm.model = model;
        }
    }

    /// Apply a partial update to the configuration
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if let Some(strategy) = overrides.merge_strategy {
            self.merge_strategy = strategy;
        }
        if let Some(model) = overrides.model {
            self.llm.model = model;
        }
        if let Some(secs) = overrides.cooldown_secs {
            self.retry.cooldown_secs = secs;
        }
        if let Some(attempts) = overrides.max_attempts {
            self.retry.max_attempts = Some(attempts.max(1));
        }
    }

    /// Checks that must pass before any network call is made.
    pub fn validate(&self) -> AppResult<()> {
        if self.llm.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(AppError::config(format!(
                "no API key configured; set {} or {}",
                API_KEY_ENV,
                self.llm.provider.api_key_env()
            )));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(AppError::config(format!(
                "temperature {} is outside 0.0..=2.0",
                self.llm.temperature
            )));
        }
        Ok(())
    }
}
