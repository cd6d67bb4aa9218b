//! Core data model types for studydash.
//!
//! `UserStats` is the persisted per-user record the score ledger mutates;
//! `ModelResponse` is the transient, validated shape of a tutor reply.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MalformedSubjectData;

/// Subject label used when an answer arrives without one.
pub const DEFAULT_SUBJECT: &str = "General";

/// Upper bound for a per-subject mastery score.
pub const MAX_SUBJECT_SCORE: u32 = 100;

/// Reply used whenever the tutor cannot produce a trustworthy response.
pub const FALLBACK_REPLY: &str = "I am thinking... try asking again!";

/// Subjects every new account starts with.
const ENROLLED_SUBJECTS: [&str; 5] = ["Math", "Science", "English", "History", "AI"];

/// Chart rows shown when the stored blob cannot be read.
const CHART_FALLBACK_SUBJECTS: [&str; 3] = ["Math", "Science", "AI"];

/// Parsed per-subject scores, keyed by exact (case-sensitive) subject name.
///
/// Values are signed: a stored blob may hold numbers outside `0..=100`,
/// and those are still readable scores rather than corruption.
pub type SubjectScores = BTreeMap<String, i64>;

/// Cumulative quiz statistics for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// Reward points; only ever increases.
    #[serde(default)]
    pub points: u32,
    /// Number of answered questions.
    #[serde(default)]
    pub quiz_count: u32,
    /// Truncated running average of 0/100 question scores.
    #[serde(default)]
    pub quiz_average: u32,
    /// Raw JSON object mapping subject name to score, exactly as persisted.
    ///
    /// Kept as text because a stored blob may be corrupt, and a corrupt blob
    /// must survive untouched.
    #[serde(default = "default_subject_blob")]
    pub subject_scores: String,
}

fn default_subject_blob() -> String {
    let scores: SubjectScores = ENROLLED_SUBJECTS
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();
    encode_subject_scores(&scores)
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            points: 0,
            quiz_count: 0,
            quiz_average: 0,
            subject_scores: default_subject_blob(),
        }
    }
}

impl UserStats {
    /// Parse the stored subject blob.
    pub fn subject_scores(&self) -> Result<SubjectScores, MalformedSubjectData> {
        parse_subject_scores(&self.subject_scores)
    }

    /// Per-subject rows for a bar chart, in subject-name order.
    ///
    /// A corrupt blob renders as a zeroed Math/Science/AI chart instead of
    /// failing the dashboard. Negative stored values chart as 0.
    pub fn subject_chart(&self) -> Vec<(String, u32)> {
        match self.subject_scores() {
            Ok(scores) => scores
                .into_iter()
                .map(|(subject, score)| (subject, chart_value(score)))
                .collect(),
            Err(err) => {
                tracing::warn!("rendering fallback subject chart: {err}");
                CHART_FALLBACK_SUBJECTS
                    .iter()
                    .map(|s| (s.to_string(), 0))
                    .collect()
            }
        }
    }
}

fn chart_value(score: i64) -> u32 {
    u32::try_from(score.max(0)).unwrap_or(u32::MAX)
}

/// Parse a subject blob into scores.
///
/// Fails only when the blob is not JSON or is not an object of integers.
pub fn parse_subject_scores(blob: &str) -> Result<SubjectScores, MalformedSubjectData> {
    serde_json::from_str(blob).map_err(|e| MalformedSubjectData {
        reason: e.to_string(),
    })
}

/// Encode scores into the persisted blob form.
pub fn encode_subject_scores(scores: &SubjectScores) -> String {
    // A map of strings to integers always serializes.
    serde_json::to_string(scores).unwrap_or_else(|_| "{}".to_string())
}

/// A user's stats as held by a store, with its optimistic-concurrency revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    /// Authenticated user identifier.
    pub user_id: String,
    /// The stats themselves.
    pub stats: UserStats,
    /// Incremented by the store on every successful save.
    #[serde(default)]
    pub revision: u64,
    /// When the store last wrote this record.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StatsRecord {
    /// A brand-new record at revision 0.
    pub fn new(user_id: impl Into<String>, stats: UserStats) -> Self {
        Self {
            user_id: user_id.into(),
            stats,
            revision: 0,
            updated_at: None,
        }
    }
}

/// A validated tutor response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelResponse {
    /// A conversational answer.
    Chat { reply: String },
    /// A generated multiple-choice quiz.
    Quiz {
        #[serde(default = "default_subject")]
        subject: String,
        questions: Vec<QuizQuestion>,
    },
}

fn default_subject() -> String {
    DEFAULT_SUBJECT.to_string()
}

impl ModelResponse {
    /// The placeholder chat reply used when validation or the model call fails.
    pub fn fallback() -> Self {
        ModelResponse::Chat {
            reply: FALLBACK_REPLY.to_string(),
        }
    }

    /// Whether this is the placeholder reply.
    pub fn is_fallback(&self) -> bool {
        matches!(self, ModelResponse::Chat { reply } if reply == FALLBACK_REPLY)
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(
        rename = "correct",
        alias = "correct_answer",
        alias = "correctAnswer",
        alias = "answer"
    )]
    pub correct_answer: String,
}
