//! studydash-providers — LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for Google Gemini and Ollama, plus an
//! offline mock, and loads the `studydash.toml` configuration that selects
//! between them.

pub mod config;
pub mod gemini;
pub mod mock;
pub mod ollama;

pub use config::{
    create_default_provider, create_provider, load_config, load_config_from, parse_config_str,
    ProviderConfig, StudydashConfig,
};
pub use studydash_core::error::ProviderError;
