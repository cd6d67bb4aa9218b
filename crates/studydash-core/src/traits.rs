//! Collaborator traits: the text-completion backend and stats storage.
//!
//! Implemented by the `studydash-providers` and `studydash-store` crates
//! respectively.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{StatsRecord, UserStats};

// ---------------------------------------------------------------------------
// LLM Provider trait
// ---------------------------------------------------------------------------

/// Trait for hosted or local text-completion backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Complete a prompt. Failures should carry a
    /// [`ProviderError`](crate::error::ProviderError) where one applies.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// List models this provider can serve.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// A single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gemini-2.5-flash").
    pub model: String,
    /// The full prompt text.
    pub prompt: String,
    /// Optional system instruction.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// The raw result of a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Untrusted text as returned by the model.
    pub content: String,
    /// Model that actually served the request.
    pub model: String,
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting for one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
}

// ---------------------------------------------------------------------------
// Stats storage trait
// ---------------------------------------------------------------------------

/// Persistence contract for per-user stats.
///
/// Each call is atomic. `save_user_stats` is a compare-and-swap on
/// `record.revision`, which is what serializes concurrent updates to the
/// same user.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Load a user's record.
    ///
    /// Returns `StoreError::NotFound` if the user has no record.
    async fn load_user_stats(&self, user_id: &str) -> Result<StatsRecord, StoreError>;

    /// Save a previously loaded record and return its new revision.
    ///
    /// Returns `StoreError::Conflict` if the stored revision no longer
    /// matches `record.revision`, and `StoreError::NotFound` if the user
    /// was never created.
    async fn save_user_stats(&self, record: &StatsRecord) -> Result<u64, StoreError>;

    /// Create a record for a new user.
    ///
    /// Returns `StoreError::Conflict` if the user already exists.
    async fn create_user_stats(
        &self,
        user_id: &str,
        stats: UserStats,
    ) -> Result<StatsRecord, StoreError>;
}

#[async_trait]
impl<T: StatsStore + ?Sized> StatsStore for std::sync::Arc<T> {
    async fn load_user_stats(&self, user_id: &str) -> Result<StatsRecord, StoreError> {
        (**self).load_user_stats(user_id).await
    }

    async fn save_user_stats(&self, record: &StatsRecord) -> Result<u64, StoreError> {
        (**self).save_user_stats(record).await
    }

    async fn create_user_stats(
        &self,
        user_id: &str,
        stats: UserStats,
    ) -> Result<StatsRecord, StoreError> {
        (**self).create_user_stats(user_id, stats).await
    }
}
