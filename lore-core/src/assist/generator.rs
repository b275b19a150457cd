//! Text generators behind field assist.

use crate::config::AssistConfig;
use async_trait::async_trait;
use claude::{Claude, Message, Request};
use thiserror::Error;

/// Errors from a text generator.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Claude request failed: {0}")]
    Claude(#[from] claude::Error),

    #[error("Generation failed: {0}")]
    Failed(String),
}

/// Something that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "generator"
    }
}

/// [`TextGenerator`] backed by the Claude Messages API.
#[derive(Clone)]
pub struct ClaudeGenerator {
    client: Claude,
    config: AssistConfig,
}

impl ClaudeGenerator {
    pub fn new(client: Claude, config: AssistConfig) -> Self {
        Self { client, config }
    }

    /// Build from `ANTHROPIC_API_KEY`.
    pub fn from_env(config: AssistConfig) -> Result<Self, GenerateError> {
        Ok(Self::new(Claude::from_env()?, config))
    }

    pub fn config(&self) -> &AssistConfig {
        &self.config
    }

    fn request(&self, prompt: &str) -> Request {
        let request = Request::new(vec![Message::user(prompt)])
            .with_system(self.config.system_prompt.clone())
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);
        match &self.config.model {
            Some(model) => request.with_model(model.clone()),
            None => request,
        }
    }
}

#[async_trait]
impl TextGenerator for ClaudeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let response = self.client.complete(self.request(prompt)).await?;
        tracing::debug!(
            model = %response.model,
            output_tokens = response.usage.output_tokens,
            "field generated"
        );
        Ok(response.text)
    }

    fn name(&self) -> &str {
        "claude"
    }
}
