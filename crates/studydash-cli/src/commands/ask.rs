//! The `studydash ask` command.

use anyhow::{Context, Result};

use studydash_core::prompt::PromptKind;
use studydash_core::tutor::Tutor;

use crate::GlobalArgs;

pub async fn execute(globals: &GlobalArgs, message: &str, quiz: bool, chat: bool) -> Result<()> {
    let config = super::load_config(globals)?;
    let provider = studydash_providers::create_default_provider(&config)?;

    let forced = match (quiz, chat) {
        (true, _) => Some(PromptKind::Quiz),
        (_, true) => Some(PromptKind::Chat),
        _ => None,
    };

    let tutor = Tutor::new(provider, config.tutor_config());
    let response = tutor.ask(message, forced).await;

    let json = serde_json::to_string_pretty(&response).context("failed to encode reply")?;
    println!("{json}");
    Ok(())
}
