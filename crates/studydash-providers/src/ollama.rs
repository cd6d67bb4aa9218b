//! Ollama (local LLM) provider.
//!
//! Talks to the `/api/chat` endpoint with JSON-constrained output, and to
//! `/api/tags` for the installed model list.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use studydash_core::error::ProviderError;
use studydash_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage,
};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Local generation is slow on CPU-only hosts.
const LOCAL_TIMEOUT_SECS: u64 = 300;

/// Provider for a local Ollama server.
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = match base_url.trim_end_matches('/') {
            "" => DEFAULT_BASE_URL.to_string(),
            trimmed => trimmed.to_string(),
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(LOCAL_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(LOCAL_TIMEOUT_SECS)
        } else if err.is_connect() {
            ProviderError::NetworkError(format!(
                "no Ollama server at {} (start one with `ollama serve`)",
                self.base_url
            ))
        } else {
            ProviderError::NetworkError(err.to_string())
        }
    }

    /// Fetch the models installed on the server.
    pub async fn list_models_async(&self) -> anyhow::Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(self.endpoint("tags"))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }
            .into());
        }

        let installed: InstalledModels = response.json().await.map_err(|e| {
            ProviderError::ApiError {
                status: status.as_u16(),
                message: format!("unreadable model list: {e}"),
            }
        })?;

        Ok(installed.models.into_iter().map(ModelInfo::from).collect())
    }
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<ChatTurn<'a>>,
    stream: bool,
    /// Constrains the reply to a JSON document.
    format: &'static str,
    options: SamplingOptions,
}

#[derive(Serialize)]
struct ChatTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct SamplingOptions {
    temperature: f64,
    num_predict: u32,
}

impl<'a> ChatBody<'a> {
    fn from_request(request: &'a GenerateRequest) -> Self {
        let system = request.system_prompt.as_deref().map(|content| ChatTurn {
            role: "system",
            content,
        });
        let user = ChatTurn {
            role: "user",
            content: &request.prompt,
        };
        Self {
            model: &request.model,
            messages: system.into_iter().chain(std::iter::once(user)).collect(),
            stream: false,
            format: "json",
            options: SamplingOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }
}

#[derive(Deserialize)]
struct ChatReply {
    model: String,
    message: ReplyMessage,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

impl ChatReply {
    fn into_response(self, latency_ms: u64) -> GenerateResponse {
        GenerateResponse {
            content: self.message.content,
            model: self.model,
            token_usage: TokenUsage {
                prompt_tokens: self.prompt_eval_count,
                completion_tokens: self.eval_count,
                total_tokens: self.prompt_eval_count + self.eval_count,
            },
            latency_ms,
        }
    }
}

#[derive(Deserialize)]
struct InstalledModels {
    #[serde(default)]
    models: Vec<InstalledModel>,
}

#[derive(Deserialize)]
struct InstalledModel {
    name: String,
}

impl From<InstalledModel> for ModelInfo {
    fn from(model: InstalledModel) -> Self {
        ModelInfo {
            id: model.name.clone(),
            name: model.name,
            provider: "ollama".into(),
            max_context: 0,
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();

        let response = self
            .client
            .post(self.endpoint("chat"))
            .json(&ChatBody::from_request(request))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::ModelNotFound(format!(
                "{} is not installed (fetch it with `ollama pull {}`)",
                request.model, request.model
            ))
            .into());
        }
        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }
            .into());
        }

        let reply: ChatReply = response.json().await.map_err(|e| ProviderError::ApiError {
            status: status.as_u16(),
            message: format!("unreadable chat reply: {e}"),
        })?;

        Ok(reply.into_response(start.elapsed().as_millis() as u64))
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        // Only the server knows; see `list_models_async`.
        Vec::new()
    }
}
