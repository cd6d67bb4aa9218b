//! Tutor prompt construction.
//!
//! There is one prompt strategy with two variants: a friendly chat answer
//! and a multiple-choice quiz. The variant is either forced by the caller or
//! detected from the message.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which response shape to ask the model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    Chat,
    Quiz,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptKind::Chat => write!(f, "chat"),
            PromptKind::Quiz => write!(f, "quiz"),
        }
    }
}

impl FromStr for PromptKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chat" => Ok(PromptKind::Chat),
            "quiz" => Ok(PromptKind::Quiz),
            other => Err(format!("unknown prompt kind: {other}")),
        }
    }
}

/// A rendered prompt ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub text: String,
}

/// Settings for prompt construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptStrategy {
    /// Messages containing this word (any case) get a quiz.
    #[serde(default = "default_quiz_keyword")]
    pub quiz_keyword: String,
    /// Fewest questions to request.
    #[serde(default = "default_min_questions")]
    pub min_questions: u32,
    /// Most questions to request.
    #[serde(default = "default_max_questions")]
    pub max_questions: u32,
}

fn default_quiz_keyword() -> String {
    "quiz".to_string()
}

fn default_min_questions() -> u32 {
    3
}

fn default_max_questions() -> u32 {
    5
}

impl Default for PromptStrategy {
    fn default() -> Self {
        Self {
            quiz_keyword: default_quiz_keyword(),
            min_questions: default_min_questions(),
            max_questions: default_max_questions(),
        }
    }
}

impl PromptStrategy {
    /// Pick the prompt variant for a message.
    pub fn detect(&self, message: &str) -> PromptKind {
        let keyword = self.quiz_keyword.trim().to_lowercase();
        if !keyword.is_empty() && message.to_lowercase().contains(&keyword) {
            PromptKind::Quiz
        } else {
            PromptKind::Chat
        }
    }

    /// Render the prompt for `message`, honoring `forced` over detection.
    pub fn build(&self, message: &str, forced: Option<PromptKind>) -> Prompt {
        let kind = forced.unwrap_or_else(|| self.detect(message));
        let text = match kind {
            PromptKind::Chat => self.chat_prompt(message),
            PromptKind::Quiz => self.quiz_prompt(message),
        };
        Prompt { kind, text }
    }

    fn chat_prompt(&self, message: &str) -> String {
        format!(
            r#"Act as a friendly AI Tutor.
User Message: "{message}"
Response Format: Return ONLY raw JSON. No Markdown.
{{ "type": "chat", "reply": "Your answer here" }}
"#
        )
    }

    fn quiz_prompt(&self, message: &str) -> String {
        let (low, high) = if self.min_questions <= self.max_questions {
            (self.min_questions.max(1), self.max_questions.max(1))
        } else {
            (self.max_questions.max(1), self.min_questions.max(1))
        };
        let count = if low == high {
            format!("{low}")
        } else {
            format!("{low} to {high}")
        };

        format!(
            r#"Create a short quiz on: "{message}".
Generate {count} multiple-choice questions.

CRITICAL: Return ONLY raw JSON. NO markdown.
Structure:
{{
    "type": "quiz",
    "subject": "Topic Name",
    "questions": [
        {{
            "question": "Question text?",
            "options": ["A", "B", "C", "D"],
            "correct": "A"
        }}
    ]
}}
"#
        )
    }
}
