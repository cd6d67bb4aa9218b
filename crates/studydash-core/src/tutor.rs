//! The AI tutor: prompt, complete, validate.
//!
//! The provider and its settings are injected at construction; the tutor
//! never reaches for a process-wide client.

use std::sync::Arc;

use tracing::instrument;

use crate::error::TutorError;
use crate::model::ModelResponse;
use crate::prompt::{PromptKind, PromptStrategy};
use crate::traits::{GenerateRequest, LlmProvider};
use crate::validator::try_parse_model_output;

/// Generation settings for the tutor.
#[derive(Debug, Clone)]
pub struct TutorConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Max tokens per reply.
    pub max_tokens: u32,
    /// How prompts are built.
    pub strategy: PromptStrategy,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
            strategy: PromptStrategy::default(),
        }
    }
}

/// Answers student messages through an LLM provider.
pub struct Tutor {
    provider: Arc<dyn LlmProvider>,
    config: TutorConfig,
}

impl Tutor {
    pub fn new(provider: Arc<dyn LlmProvider>, config: TutorConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    /// Ask the model and validate its reply, reporting why it failed.
    #[instrument(skip(self, message), fields(provider = self.provider.name(), model = %self.config.model))]
    pub async fn try_ask(
        &self,
        message: &str,
        forced: Option<PromptKind>,
    ) -> Result<ModelResponse, TutorError> {
        let prompt = self.config.strategy.build(message, forced);
        tracing::debug!("sending {} prompt", prompt.kind);

        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: prompt.text,
            system_prompt: None,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .provider
            .generate(&request)
            .await
            .map_err(TutorError::Upstream)?;

        tracing::debug!(
            "model replied in {}ms ({} tokens)",
            response.latency_ms,
            response.token_usage.total_tokens
        );

        Ok(try_parse_model_output(&response.content)?)
    }

    /// Ask the model; any failure becomes the fallback chat reply.
    pub async fn ask(&self, message: &str, forced: Option<PromptKind>) -> ModelResponse {
        match self.try_ask(message, forced).await {
            Ok(response) => response,
            Err(e) => {
                match e.provider_error() {
                    Some(pe) if pe.is_permanent() => {
                        tracing::error!("tutor provider misconfigured: {e}");
                    }
                    _ => tracing::warn!("tutor falling back to placeholder reply: {e}"),
                }
                ModelResponse::fallback()
            }
        }
    }
}
