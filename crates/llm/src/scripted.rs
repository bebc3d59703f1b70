//! Scripted Provider
//!
//! An in-memory [`LlmProvider`] that replays canned replies. Used by unit and
//! integration tests across the workspace, and handy for dry runs without
//! network access.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::provider::LlmProvider;
use crate::types::{LlmError, LlmResponse, LlmResult, Message, ProviderConfig};

type Responder = Box<dyn Fn(&str) -> LlmResult<String> + Send + Sync>;

enum Script {
    Queue(Mutex<VecDeque<LlmResult<String>>>),
    Function(Responder),
}

/// Provider returning scripted replies and recording every prompt it saw.
pub struct ScriptedProvider {
    config: ProviderConfig,
    script: Script,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// Replies in order; an exhausted queue yields an error.
    pub fn queue(replies: Vec<LlmResult<String>>) -> Self {
        Self::with_script(Script::Queue(Mutex::new(replies.into())))
    }

    /// Replies computed from the prompt text.
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&str) -> LlmResult<String> + Send + Sync + 'static,
    {
        Self::with_script(Script::Function(Box::new(responder)))
    }

    fn with_script(script: Script) -> Self {
        Self {
            config: ProviderConfig {
                model: "scripted".to_string(),
                ..Default::default()
            },
            script,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn send_message(&self, messages: Vec<Message>) -> LlmResult<LlmResponse> {
        let prompt = messages
            .into_iter()
            .map(|m| m.content)
            .collect::<Vec<_>>()
            .join("\n");

        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        let reply = match &self.script {
            Script::Queue(queue) => queue
                .lock()
                .map_err(|_| LlmError::Other {
                    message: "scripted queue poisoned".to_string(),
                })?
                .pop_front()
                .unwrap_or_else(|| {
                    Err(LlmError::Other {
                        message: "scripted replies exhausted".to_string(),
                    })
                }),
            Script::Function(responder) => responder(&prompt),
        };

        reply.map(|text| LlmResponse::text(text, self.config.model.clone()))
    }
}
