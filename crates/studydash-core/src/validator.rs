//! Model-response validation.
//!
//! The hosted model is asked for raw JSON but regularly wraps it in markdown
//! fences or ignores the requested shape entirely. Everything it returns goes
//! through here before the rest of the system sees it.

use crate::error::MalformedModelOutput;
use crate::model::ModelResponse;

const FENCE: &str = "```";

/// Remove a leading fence (with optional language tag) and a trailing fence.
///
/// Surrounding whitespace is trimmed before and after. Text without fences
/// comes back trimmed and otherwise unchanged.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+')))
            .unwrap_or(rest.len());
        text = &rest[tag_len..];
    }

    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }

    text.trim()
}

/// Parse model output into a chat or quiz response, reporting why it failed.
///
/// Stricter than the bare `ModelResponse` shape: a quiz with no questions
/// is rejected as [`MalformedModelOutput::EmptyQuiz`], and a question with
/// no options as [`MalformedModelOutput::QuestionWithoutOptions`], since
/// neither can be answered.
pub fn try_parse_model_output(raw: &str) -> Result<ModelResponse, MalformedModelOutput> {
    let text = strip_fences(raw);
    if text.is_empty() {
        return Err(MalformedModelOutput::Empty);
    }

    // Two passes so syntax errors and shape errors stay distinguishable.
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| MalformedModelOutput::Syntax(e.to_string()))?;
    let response: ModelResponse =
        serde_json::from_value(value).map_err(|e| MalformedModelOutput::Shape(e.to_string()))?;

    if let ModelResponse::Quiz { questions, .. } = &response {
        if questions.is_empty() {
            return Err(MalformedModelOutput::EmptyQuiz);
        }
        if let Some(index) = questions.iter().position(|q| q.options.is_empty()) {
            return Err(MalformedModelOutput::QuestionWithoutOptions(index));
        }
    }

    Ok(response)
}

/// Parse model output, substituting the fallback chat reply on any failure.
pub fn parse_model_output(raw: &str) -> ModelResponse {
    match try_parse_model_output(raw) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                "discarding model output ({} bytes), using fallback reply: {e}",
                raw.len()
            );
            ModelResponse::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuizQuestion, FALLBACK_REPLY};

    fn chat(reply: &str) -> ModelResponse {
        ModelResponse::Chat {
            reply: reply.to_string(),
        }
    }

    #[test]
    fn clean_chat_json() {
        assert_eq!(
            parse_model_output(r#"{"type":"chat","reply":"hi"}"#),
            chat("hi")
        );
    }

    #[test]
    fn fenced_json_matches_unfenced() {
        let clean = r#"{"type":"chat","reply":"hi"}"#;
        let fenced = "```json\n{\"type\":\"chat\",\"reply\":\"hi\"}\n```";
        assert_eq!(parse_model_output(fenced), parse_model_output(clean));
    }

    #[test]
    fn strip_fences_variants() {
        assert_eq!(strip_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_fences("  ```JSON {} ```  "), "{}");
        assert_eq!(strip_fences("{}"), "{}");
        assert_eq!(strip_fences("  {}\n"), "{}");
        assert_eq!(strip_fences("```"), "");
        assert_eq!(strip_fences(""), "");
    }

    #[test]
    fn strip_fences_only_removes_a_trailing_fence_once() {
        assert_eq!(strip_fences("{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn garbage_falls_back() {
        for raw in ["", "not json", r#"{"type":"unknown"}"#, "   ", "```json\n```"] {
            let response = parse_model_output(raw);
            assert_eq!(response, chat(FALLBACK_REPLY), "input: {raw:?}");
        }
    }

    #[test]
    fn failure_kinds_are_named() {
        assert_eq!(try_parse_model_output(""), Err(MalformedModelOutput::Empty));
        assert!(matches!(
            try_parse_model_output("not json"),
            Err(MalformedModelOutput::Syntax(_))
        ));
        assert!(matches!(
            try_parse_model_output(r#"{"type":"unknown"}"#),
            Err(MalformedModelOutput::Shape(_))
        ));
        assert!(matches!(
            try_parse_model_output(r#"{"reply":"no tag"}"#),
            Err(MalformedModelOutput::Shape(_))
        ));
        assert!(matches!(
            try_parse_model_output(r#"{"type":"chat"}"#),
            Err(MalformedModelOutput::Shape(_))
        ));
        assert!(matches!(
            try_parse_model_output("[1, 2, 3]"),
            Err(MalformedModelOutput::Shape(_))
        ));
    }

    #[test]
    fn quiz_payload() {
        let raw = r#"```json
{
    "type": "quiz",
    "subject": "Photosynthesis",
    "questions": [
        {
            "question": "What gas do plants absorb?",
            "options": ["Oxygen", "Carbon dioxide", "Nitrogen", "Helium"],
            "correct": "Carbon dioxide"
        }
    ]
}
```"#;
        let response = try_parse_model_output(raw).unwrap();
        assert_eq!(
            response,
            ModelResponse::Quiz {
                subject: "Photosynthesis".into(),
                questions: vec![QuizQuestion {
                    question: "What gas do plants absorb?".into(),
                    options: vec![
                        "Oxygen".into(),
                        "Carbon dioxide".into(),
                        "Nitrogen".into(),
                        "Helium".into()
                    ],
                    correct_answer: "Carbon dioxide".into(),
                }],
            }
        );
    }

    #[test]
    fn quiz_without_subject_defaults_to_general() {
        let raw = r#"{"type":"quiz","questions":[{"question":"q","options":["a"],"correctAnswer":"a"}]}"#;
        match try_parse_model_output(raw).unwrap() {
            ModelResponse::Quiz { subject, .. } => assert_eq!(subject, "General"),
            other => panic!("expected quiz, got {other:?}"),
        }
    }

    #[test]
    fn quiz_with_plain_answer_key() {
        let raw = r#"{"type":"quiz","subject":"Math","questions":[{"question":"2+2?","options":["3","4"],"answer":"4"}]}"#;
        match try_parse_model_output(raw).unwrap() {
            ModelResponse::Quiz { questions, .. } => assert_eq!(questions[0].correct_answer, "4"),
            other => panic!("expected quiz, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_quizzes_are_rejected() {
        assert_eq!(
            try_parse_model_output(r#"{"type":"quiz","subject":"Math","questions":[]}"#),
            Err(MalformedModelOutput::EmptyQuiz)
        );
        let raw = r#"{"type":"quiz","subject":"Math","questions":[
            {"question":"a","options":["x"],"correct":"x"},
            {"question":"b","options":[],"correct":"y"}
        ]}"#;
        assert_eq!(
            try_parse_model_output(raw),
            Err(MalformedModelOutput::QuestionWithoutOptions(1))
        );
        assert!(parse_model_output(raw).is_fallback());
    }

    #[test]
    fn chat_ignores_extra_fields() {
        let raw = r#"{"type":"chat","reply":"Photosynthesis turns light into sugar.","mood":"cheerful"}"#;
        assert_eq!(
            parse_model_output(raw),
            chat("Photosynthesis turns light into sugar.")
        );
    }
}
