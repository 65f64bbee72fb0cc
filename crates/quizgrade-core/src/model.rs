//! Core data model types for quizgrade.
//!
//! A quiz run produces an ordered list of [`QuizAnswer`]s. Grading turns
//! each one into exactly one [`Verdict`], in the same order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One answered quiz question, as sent to the grader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    /// The question text shown to the player.
    pub question: String,
    /// The answer stored with the question.
    pub correct_answer: String,
    /// What the player typed. May be empty.
    #[serde(default)]
    pub user_answer: String,
}

impl QuizAnswer {
    pub fn new(
        question: impl Into<String>,
        correct_answer: impl Into<String>,
        user_answer: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            correct_answer: correct_answer.into(),
            user_answer: user_answer.into(),
        }
    }

    /// Whether the player left this question unanswered. Whitespace counts
    /// as an answer and is sent to the grader as typed.
    pub fn is_blank(&self) -> bool {
        self.user_answer.is_empty()
    }
}

/// Whether an answer was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Outcome {
    pub fn is_correct(self) -> bool {
        self == Outcome::Correct
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Correct => write!(f, "Correct"),
            Outcome::Incorrect => write!(f, "Incorrect"),
        }
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "correct" => Ok(Outcome::Correct),
            "incorrect" => Ok(Outcome::Incorrect),
            other => Err(format!("unknown result: {other}")),
        }
    }
}

/// The graded form of a [`QuizAnswer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub question: String,
    pub correct_answer: String,
    pub user_answer: String,
    pub result: Outcome,
    /// Short explanation from the grader, if it gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}

impl Verdict {
    /// Build a verdict that carries the answer's own text.
    pub fn for_answer(answer: &QuizAnswer, result: Outcome, justification: Option<String>) -> Self {
        Self {
            question: answer.question.clone(),
            correct_answer: answer.correct_answer.clone(),
            user_answer: answer.user_answer.clone(),
            result,
            justification,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.result.is_correct()
    }
}

/// External text-generation services that can grade answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiService {
    OpenAi,
    Gemini,
}

impl AiService {
    pub const ALL: [AiService; 2] = [AiService::OpenAi, AiService::Gemini];

    /// Key used in settings and config files.
    pub fn as_str(self) -> &'static str {
        match self {
            AiService::OpenAi => "openai",
            AiService::Gemini => "gemini",
        }
    }

    /// Model used when the settings leave the model id empty.
    pub fn fallback_model(self) -> &'static str {
        match self {
            AiService::OpenAi => "gpt-4o-mini",
            AiService::Gemini => "gemini-1.5-flash",
        }
    }

    /// Resolve a configured model id, falling back when it is blank.
    pub fn resolve_model(self, model: &str) -> String {
        let model = model.trim();
        if model.is_empty() {
            self.fallback_model().to_string()
        } else {
            model.to_string()
        }
    }
}

impl fmt::Display for AiService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiService {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "gpt" => Ok(AiService::OpenAi),
            "gemini" | "google" => Ok(AiService::Gemini),
            other => Err(format!("unknown AI service: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_display_and_parse() {
        assert_eq!(AiService::OpenAi.to_string(), "openai");
        assert_eq!(AiService::Gemini.to_string(), "gemini");
        assert_eq!("OpenAI".parse::<AiService>().unwrap(), AiService::OpenAi);
        assert_eq!("google".parse::<AiService>().unwrap(), AiService::Gemini);
        assert!("claude".parse::<AiService>().is_err());
    }

    #[test]
    fn service_serde_uses_settings_keys() {
        assert_eq!(
            serde_json::to_string(&AiService::OpenAi).unwrap(),
            "\"openai\""
        );
        let parsed: AiService = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(parsed, AiService::Gemini);
    }

    #[test]
    fn blank_model_falls_back() {
        assert_eq!(AiService::OpenAi.resolve_model(""), "gpt-4o-mini");
        assert_eq!(AiService::Gemini.resolve_model("  "), "gemini-1.5-flash");
        assert_eq!(AiService::Gemini.resolve_model("gemini-pro"), "gemini-pro");
    }

    #[test]
    fn answer_json_is_camel_case() {
        let json = r#"{"question":"2+2?","correctAnswer":"4","userAnswer":"four"}"#;
        let answer: QuizAnswer = serde_json::from_str(json).unwrap();
        assert_eq!(answer.correct_answer, "4");
        assert_eq!(answer.user_answer, "four");

        let missing: QuizAnswer =
            serde_json::from_str(r#"{"question":"q","correctAnswer":"a"}"#).unwrap();
        assert!(missing.is_blank());
        assert!(!QuizAnswer::new("q", "a", " ").is_blank());
    }

    #[test]
    fn outcome_parse_is_case_insensitive() {
        assert_eq!("CORRECT".parse::<Outcome>().unwrap(), Outcome::Correct);
        assert_eq!(" incorrect ".parse::<Outcome>().unwrap(), Outcome::Incorrect);
        assert!("maybe".parse::<Outcome>().is_err());
    }

    #[test]
    fn verdict_skips_missing_justification() {
        let answer = QuizAnswer::new("q", "a", "a");
        let verdict = Verdict::for_answer(&answer, Outcome::Correct, None);
        let json = serde_json::to_string(&verdict).unwrap();
        assert!(!json.contains("justification"));
        assert!(json.contains("\"result\":\"Correct\""));
    }
}
