//! The `studydash init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    let path = Path::new("studydash.toml");
    if path.exists() {
        println!("studydash.toml already exists, skipping.");
        return Ok(());
    }

    std::fs::write(path, SAMPLE_CONFIG).context("failed to write studydash.toml")?;
    println!("Created studydash.toml");

    println!("\nNext steps:");
    println!("  1. Export GEMINI_API_KEY, or edit studydash.toml");
    println!("  2. Run: studydash enroll --user <name>");
    println!("  3. Run: studydash ask --message \"quiz me on fractions\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# studydash configuration

default_provider = "gemini"
default_model = "gemini-2.5-flash"
temperature = 0.7
max_tokens = 2048
data_dir = "./studydash-data"

[prompt]
quiz_keyword = "quiz"
min_questions = 3
max_questions = 5

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"

# Canned replies for working offline:
# [providers.offline]
# type = "mock"
"#;
