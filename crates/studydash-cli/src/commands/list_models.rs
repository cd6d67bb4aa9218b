//! The `studydash list-models` command.

use anyhow::Result;

use studydash_providers::ollama::OllamaProvider;
use studydash_providers::{create_provider, ProviderConfig};

use crate::GlobalArgs;

pub async fn execute(globals: &GlobalArgs, provider_filter: Option<String>) -> Result<()> {
    let config = super::load_config(globals)?;

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();

    let mut found_any = false;
    for name in names {
        if provider_filter.as_ref().is_some_and(|filter| filter != name) {
            continue;
        }

        let provider_config = &config.providers[name];
        let models = match provider_config {
            // Installed models are only known by asking the server.
            ProviderConfig::Ollama { base_url } => {
                match OllamaProvider::new(base_url)?.list_models_async().await {
                    Ok(models) => models,
                    Err(e) => {
                        tracing::warn!("skipping provider {name}: {e:#}");
                        continue;
                    }
                }
            }
            _ => match create_provider(name, provider_config) {
                Ok(provider) => provider.available_models(),
                Err(e) => {
                    tracing::warn!("skipping provider {name}: {e:#}");
                    continue;
                }
            },
        };

        if !models.is_empty() {
            found_any = true;
            println!("Provider: {name}");
            for model in &models {
                if model.max_context > 0 {
                    println!(
                        "  {} ({}, {}K context)",
                        model.id,
                        model.name,
                        model.max_context / 1000
                    );
                } else {
                    println!("  {}", model.id);
                }
            }
            println!();
        }
    }

    if !found_any {
        println!("No providers configured. Run `studydash init` to create a config file.");
    }

    Ok(())
}
