//! The `studydash answer` command.

use anyhow::{Context, Result};

use studydash_core::ledger::{Answer, SubjectOutcome};

use crate::GlobalArgs;

pub async fn execute(
    globals: &GlobalArgs,
    user: &str,
    subject: Option<String>,
    correct: bool,
) -> Result<()> {
    let ledger = super::open_ledger(globals)?;
    let answer = Answer { correct, subject };

    let receipt = ledger
        .record(user, &answer)
        .await
        .with_context(|| format!("failed to record answer for {user}"))?;

    println!("{}", if correct { "Correct!" } else { "Not quite." });
    println!("Points: {}", receipt.points);
    println!("Questions answered: {}", receipt.quiz_count);
    println!("Quiz average: {}", receipt.quiz_average);
    match receipt.subject {
        SubjectOutcome::Updated { subject, score } => println!("{subject}: {score}"),
        SubjectOutcome::Skipped { error } => {
            println!("Subject scores unchanged ({error})")
        }
    }
    Ok(())
}
