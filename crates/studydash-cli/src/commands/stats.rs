//! The `studydash stats` command.

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use studydash_core::model::MAX_SUBJECT_SCORE;

use crate::GlobalArgs;

const BAR_WIDTH: u32 = 20;

pub async fn execute(globals: &GlobalArgs, user: &str) -> Result<()> {
    let ledger = super::open_ledger(globals)?;
    let record = ledger
        .snapshot(user)
        .await
        .with_context(|| format!("failed to load stats for {user}"))?;
    let stats = &record.stats;

    let mut summary = Table::new();
    summary.set_header(vec!["User", "Points", "Questions", "Quiz average"]);
    summary.add_row(vec![
        Cell::new(&record.user_id),
        Cell::new(stats.points),
        Cell::new(stats.quiz_count),
        Cell::new(format!("{}%", stats.quiz_average)),
    ]);
    println!("{summary}");

    let mut subjects = Table::new();
    subjects.set_header(vec!["Subject", "Score", ""]);
    for (subject, score) in stats.subject_chart() {
        subjects.add_row(vec![
            Cell::new(&subject),
            Cell::new(score),
            Cell::new(bar(score)),
        ]);
    }
    println!("{subjects}");

    if let Some(updated_at) = record.updated_at {
        println!("Last updated {}", updated_at.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

fn bar(score: u32) -> String {
    let filled = score.min(MAX_SUBJECT_SCORE) * BAR_WIDTH / MAX_SUBJECT_SCORE;
    "#".repeat(filled as usize)
}
