//! Text Generation Client
//!
//! Wraps an [`LlmProvider`] into the single `prompt -> text` operation the
//! review pipeline uses. Rate-limited calls are retried after a fixed
//! cooldown; every other error propagates on the first attempt. There is no
//! exponential backoff and no circuit breaker.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::provider::LlmProvider;
use crate::types::{LlmError, LlmResponse, LlmResult, Message};

/// Retry behaviour for rate-limited calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Fixed wait after a rate-limit response
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Total attempts per call; `None` retries until success or cancellation
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// Upper bound on a single provider call
    #[serde(default)]
    pub call_timeout_secs: Option<u64>,
}

fn default_cooldown_secs() -> u64 {
    60
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            max_attempts: None,
            call_timeout_secs: None,
        }
    }
}

impl RetryPolicy {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn with_cooldown_secs(mut self, secs: u64) -> Self {
        self.cooldown_secs = secs;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }

    pub fn with_call_timeout_secs(mut self, secs: u64) -> Self {
        self.call_timeout_secs = Some(secs);
        self
    }
}

/// Rate-limit aware `prompt -> text` client.
#[derive(Clone)]
pub struct TextGenerationClient {
    provider: Arc<dyn LlmProvider>,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl TextGenerationClient {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            policy: RetryPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Share a cancellation token with the caller (e.g. a Ctrl-C handler).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Send `prompt` as a single user message and return the text reply.
    pub async fn generate(&self, prompt: &str) -> LlmResult<String> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            if self.cancel.is_cancelled() {
                return Err(LlmError::Cancelled);
            }

            match self.call_once(prompt).await {
                Ok(response) => {
                    if response.is_truncated() {
                        tracing::warn!(
                            provider = self.provider.name(),
                            "Response hit the token limit; output may be incomplete"
                        );
                    }
                    return Ok(response.content.unwrap_or_default());
                }
                Err(LlmError::RateLimited { message, .. }) => {
                    if let Some(max) = self.policy.max_attempts {
                        if attempt >= max {
                            return Err(LlmError::RetriesExhausted {
                                attempts: attempt,
                                message,
                            });
                        }
                    }
                    tracing::warn!(
                        provider = self.provider.name(),
                        attempt,
                        cooldown_secs = self.policy.cooldown_secs,
                        "Rate limited, cooling down before retry"
                    );
                    tokio::select! {
                        _ = self.cancel.cancelled() => return Err(LlmError::Cancelled),
                        _ = tokio::time::sleep(self.policy.cooldown()) => {}
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn call_once(&self, prompt: &str) -> LlmResult<LlmResponse> {
        let messages = vec![Message::user(prompt)];
        let call = self.provider.send_message(messages);

        let bounded = async {
            match self.policy.call_timeout_secs {
                Some(secs) => tokio::time::timeout(Duration::from_secs(secs), call)
                    .await
                    .map_err(|_| LlmError::Timeout { seconds: secs })?,
                None => call.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(LlmError::Cancelled),
            result = bounded => result,
        }
    }
}
