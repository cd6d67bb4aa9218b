//! Configuration loading and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use studydash_core::prompt::PromptStrategy;
use studydash_core::traits::LlmProvider;
use studydash_core::tutor::TutorConfig;

use crate::gemini::GeminiProvider;
use crate::mock::MockProvider;
use crate::ollama::OllamaProvider;

/// Configuration for a single LLM provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
    /// Canned replies, for offline use.
    Mock {
        #[serde(default)]
        response: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Mock { response } => f
                .debug_struct("Mock")
                .field("response", response)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Top-level studydash configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudydashConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider the tutor uses.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model the tutor asks for.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature for tutor replies.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Max tokens per tutor reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Directory holding per-user stats files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Prompt construction settings.
    #[serde(default)]
    pub prompt: PromptStrategy,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./studydash-data")
}

impl Default for StudydashConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            data_dir: default_data_dir(),
            prompt: PromptStrategy::default(),
        }
    }
}

impl StudydashConfig {
    /// Tutor settings derived from this config.
    pub fn tutor_config(&self) -> TutorConfig {
        TutorConfig {
            model: self.default_model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            strategy: self.prompt.clone(),
        }
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            (0.0..=2.0).contains(&self.temperature),
            "temperature must be between 0.0 and 2.0"
        );
        anyhow::ensure!(self.max_tokens >= 1, "max_tokens must be at least 1");
        anyhow::ensure!(
            self.prompt.min_questions >= 1 && self.prompt.min_questions <= self.prompt.max_questions,
            "prompt.min_questions must be between 1 and prompt.max_questions"
        );
        Ok(())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
        },
        ProviderConfig::Mock { response } => ProviderConfig::Mock {
            response: response.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `studydash.toml` in the current directory
/// 2. `~/.config/studydash/config.toml`
///
/// Environment variable override: `GEMINI_API_KEY`.
pub fn load_config() -> Result<StudydashConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<StudydashConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("studydash.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => StudydashConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            });
        if let Some(ProviderConfig::Gemini { api_key, .. }) = config.providers.get_mut("gemini") {
            *api_key = key;
        }
    }

    // Resolve env vars in all provider configs
    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    config.validate()?;
    Ok(config)
}

/// Parse a TOML config string without touching the environment.
pub fn parse_config_str(content: &str) -> Result<StudydashConfig> {
    Ok(toml::from_str::<StudydashConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("studydash"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>> {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            anyhow::ensure!(
                !api_key.trim().is_empty(),
                "provider '{name}' has no API key; set GEMINI_API_KEY or api_key in the config"
            );
            Ok(Arc::new(GeminiProvider::new(api_key, base_url.clone())?))
        }
        ProviderConfig::Ollama { base_url } => Ok(Arc::new(OllamaProvider::new(base_url)?)),
        ProviderConfig::Mock { response } => Ok(Arc::new(match response {
            Some(text) => MockProvider::with_fixed_response(text),
            None => MockProvider::new(HashMap::new()),
        })),
    }
}

/// Create the provider named by `default_provider`.
pub fn create_default_provider(config: &StudydashConfig) -> Result<Arc<dyn LlmProvider>> {
    let name = &config.default_provider;
    let provider_config = config.providers.get(name).with_context(|| {
        format!("default provider '{name}' is not configured; run `studydash init` or set GEMINI_API_KEY")
    })?;
    create_provider(name, provider_config)
}
