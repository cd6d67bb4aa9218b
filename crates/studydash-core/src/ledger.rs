//! The score ledger.
//!
//! Applies one answered quiz question to a user's cumulative stats. The
//! average is rebuilt from the stored (already truncated) average on every
//! update, so it can drift from the true mean over long runs. That drift is
//! the established behavior of stored records and is kept as is.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{MalformedSubjectData, StoreError};
use crate::model::{
    encode_subject_scores, StatsRecord, UserStats, DEFAULT_SUBJECT, MAX_SUBJECT_SCORE,
};
use crate::traits::StatsStore;

/// Points awarded per correct answer.
pub const CORRECT_ANSWER_POINTS: u32 = 10;

/// Per-subject gain on a correct answer.
pub const SUBJECT_GAIN: i64 = 10;

/// Per-subject loss on an incorrect answer.
pub const SUBJECT_PENALTY: i64 = 5;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub correct: bool,
    /// Subject label; missing or blank means [`DEFAULT_SUBJECT`].
    #[serde(default)]
    pub subject: Option<String>,
}

impl Answer {
    pub fn correct(subject: impl Into<String>) -> Self {
        Self {
            correct: true,
            subject: Some(subject.into()),
        }
    }

    pub fn incorrect(subject: impl Into<String>) -> Self {
        Self {
            correct: false,
            subject: Some(subject.into()),
        }
    }

    /// The subject this answer counts towards.
    pub fn subject_label(&self) -> &str {
        match self.subject.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => DEFAULT_SUBJECT,
        }
    }
}

/// What happened to the per-subject scores during an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubjectOutcome {
    Updated { subject: String, score: i64 },
    /// The stored blob was unreadable and left untouched.
    Skipped { error: MalformedSubjectData },
}

/// The stats after an update, for immediate feedback to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerReceipt {
    pub points: u32,
    pub quiz_count: u32,
    pub quiz_average: u32,
    pub subject: SubjectOutcome,
}

/// Apply one answer to `stats` in place.
///
/// Points and the running average are always updated. A correct answer
/// raises the subject score by 10, capped at 100; an incorrect one lowers it
/// by 5, floored at 0. Only the bound on the moving side is applied, so a
/// stored 150 drops to 145 and a stored -20 rises to -10. The per-subject
/// update is skipped, leaving the blob unchanged, when the blob is corrupt.
pub fn record_answer(stats: &mut UserStats, answer: &Answer) -> AnswerReceipt {
    if answer.correct {
        stats.points = stats.points.saturating_add(CORRECT_ANSWER_POINTS);
    }

    let score: u64 = if answer.correct { 100 } else { 0 };
    let total_so_far = u64::from(stats.quiz_average) * u64::from(stats.quiz_count);
    stats.quiz_count = stats.quiz_count.saturating_add(1);
    stats.quiz_average = ((total_so_far + score) / u64::from(stats.quiz_count)) as u32;

    let subject = apply_subject_update(stats, answer);

    AnswerReceipt {
        points: stats.points,
        quiz_count: stats.quiz_count,
        quiz_average: stats.quiz_average,
        subject,
    }
}

fn apply_subject_update(stats: &mut UserStats, answer: &Answer) -> SubjectOutcome {
    let mut scores = match stats.subject_scores() {
        Ok(scores) => scores,
        Err(error) => {
            tracing::warn!("skipping subject update: {error}");
            return SubjectOutcome::Skipped { error };
        }
    };

    let subject = answer.subject_label().to_string();
    let current = scores.entry(subject.clone()).or_insert(0);
    *current = if answer.correct {
        current
            .saturating_add(SUBJECT_GAIN)
            .min(i64::from(MAX_SUBJECT_SCORE))
    } else {
        current.saturating_sub(SUBJECT_PENALTY).max(0)
    };
    let score = *current;

    stats.subject_scores = encode_subject_scores(&scores);
    SubjectOutcome::Updated { subject, score }
}

/// Score ledger bound to a stats store.
pub struct ScoreLedger<S> {
    store: S,
}

impl<S: StatsStore> ScoreLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create the default record for a new user.
    pub async fn enroll(&self, user_id: &str) -> Result<StatsRecord, StoreError> {
        self.store
            .create_user_stats(user_id, UserStats::default())
            .await
    }

    /// Load a user's current record without changing it.
    pub async fn snapshot(&self, user_id: &str) -> Result<StatsRecord, StoreError> {
        self.store.load_user_stats(user_id).await
    }

    /// Load, update, and save a user's stats for one answered question.
    ///
    /// A conflicting concurrent save surfaces as `StoreError::Conflict`;
    /// nothing is retried here.
    #[instrument(skip(self, answer), fields(correct = answer.correct))]
    pub async fn record(&self, user_id: &str, answer: &Answer) -> Result<AnswerReceipt, StoreError> {
        let mut record = self.store.load_user_stats(user_id).await?;
        let receipt = record_answer(&mut record.stats, answer);
        let revision = self.store.save_user_stats(&record).await?;

        tracing::debug!(
            "recorded answer for {user_id}: points={} average={} revision={revision}",
            receipt.points,
            receipt.quiz_average
        );

        Ok(receipt)
    }
}
