//! Subcommand implementations.

pub mod answer;
pub mod ask;
pub mod enroll;
pub mod init;
pub mod list_models;
pub mod stats;

use anyhow::{Context, Result};

use studydash_core::ledger::ScoreLedger;
use studydash_providers::StudydashConfig;
use studydash_store::JsonFileStatsStore;

use crate::GlobalArgs;

/// Load the config named by `--config`, or search the default locations.
pub fn load_config(globals: &GlobalArgs) -> Result<StudydashConfig> {
    studydash_providers::load_config_from(globals.config.as_deref())
}

/// Open the file-backed ledger, honouring `--data-dir`.
pub fn open_ledger(globals: &GlobalArgs) -> Result<ScoreLedger<JsonFileStatsStore>> {
    let config = load_config(globals)?;
    let data_dir = globals.data_dir.clone().unwrap_or(config.data_dir);
    let store = JsonFileStatsStore::open(&data_dir)
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;
    Ok(ScoreLedger::new(store))
}
