//! Error types shared across studydash crates.
//!
//! `ProviderError` lives here rather than in `studydash-providers` so the
//! tutor can downcast and classify upstream failures without string matching.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if this error is permanent and retrying will not help.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// The persisted per-subject score blob could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("malformed subject data: {reason}")]
pub struct MalformedSubjectData {
    pub reason: String,
}

/// Model output that could not be turned into a [`ModelResponse`].
///
/// [`ModelResponse`]: crate::model::ModelResponse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedModelOutput {
    /// Nothing left after fence stripping.
    #[error("model output is empty")]
    Empty,

    /// Not valid JSON.
    #[error("model output is not valid JSON: {0}")]
    Syntax(String),

    /// Valid JSON, but not a chat or quiz payload.
    #[error("model output has an unexpected shape: {0}")]
    Shape(String),

    /// A quiz payload without any questions.
    #[error("quiz contains no questions")]
    EmptyQuiz,

    /// A quiz question with an empty option list.
    #[error("quiz question {0} has no options")]
    QuestionWithoutOptions(usize),
}

/// Errors surfaced by stats storage backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("user not found: {0}")]
    NotFound(String),

    /// The record changed since it was loaded, or already exists on create.
    #[error("conflicting update for user {user_id} (expected revision {expected}, found {found})")]
    Conflict {
        user_id: String,
        expected: u64,
        found: u64,
    },

    #[error("invalid user id: {0:?}")]
    InvalidUserId(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Build an I/O error tagged with the path that failed.
    pub fn io(path: impl Into<std::path::PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Why a tutor request fell back to the placeholder reply.
#[derive(Debug, Error)]
pub enum TutorError {
    /// The completion call itself failed.
    #[error("upstream model call failed: {0:#}")]
    Upstream(anyhow::Error),

    /// The completion succeeded but the text did not validate.
    #[error(transparent)]
    Malformed(#[from] MalformedModelOutput),
}

impl TutorError {
    /// The classified provider failure, if the upstream error carries one.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            TutorError::Upstream(err) => err.downcast_ref::<ProviderError>(),
            TutorError::Malformed(_) => None,
        }
    }
}
