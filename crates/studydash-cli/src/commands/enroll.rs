//! The `studydash enroll` command.

use anyhow::{Context, Result};

use crate::GlobalArgs;

pub async fn execute(globals: &GlobalArgs, user: &str) -> Result<()> {
    let ledger = super::open_ledger(globals)?;
    let record = ledger
        .enroll(user)
        .await
        .with_context(|| format!("failed to enroll {user}"))?;

    tracing::info!("enrolled {user}");
    println!("Enrolled {}", record.user_id);
    for (subject, score) in record.stats.subject_chart() {
        println!("  {subject}: {score}");
    }
    Ok(())
}
