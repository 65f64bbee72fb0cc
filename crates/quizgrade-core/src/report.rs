//! Evaluation records with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluation::ResponseFormat;
use crate::model::{AiService, Verdict};
use crate::traits::TokenUsage;

/// The outcome of grading one completed quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizEvaluation {
    /// Unique evaluation identifier.
    pub id: Uuid,
    /// When the evaluation finished.
    pub created_at: DateTime<Utc>,
    /// Service that graded the answers.
    pub service: AiService,
    /// Model that graded the answers.
    pub model: String,
    /// How the grading reply was read.
    pub format: ResponseFormat,
    /// Whether the reply could not be parsed and fallback verdicts were used.
    pub parse_failed: bool,
    /// One verdict per answer, in quiz order.
    pub verdicts: Vec<Verdict>,
    /// The grading reply exactly as received.
    pub raw_response: String,
    pub token_usage: TokenUsage,
    /// Wall-clock duration of the grading request in milliseconds.
    pub duration_ms: u64,
}

impl QuizEvaluation {
    pub fn total(&self) -> usize {
        self.verdicts.len()
    }

    pub fn correct_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_correct()).count()
    }

    /// Percentage of correct answers, rounded to the nearest whole number.
    pub fn score_percent(&self) -> u32 {
        score_percent(self.correct_count(), self.total())
    }

    /// Save the evaluation as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("failed to serialize evaluation")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write evaluation to {}", path.display()))?;
        Ok(())
    }

    /// Load an evaluation from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read evaluation from {}", path.display()))?;
        let evaluation: QuizEvaluation =
            serde_json::from_str(&content).context("failed to parse evaluation JSON")?;
        Ok(evaluation)
    }
}

/// `correct` out of `total` as a whole percentage. Zero when `total` is zero.
pub fn score_percent(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Outcome, QuizAnswer};

    fn make_evaluation(results: &[Outcome]) -> QuizEvaluation {
        let verdicts = results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                Verdict::for_answer(
                    &QuizAnswer::new(format!("q{i}"), "a", "a"),
                    *r,
                    Some("ok".into()),
                )
            })
            .collect();
        QuizEvaluation {
            id: Uuid::nil(),
            created_at: Utc::now(),
            service: AiService::OpenAi,
            model: "gpt-4o-mini".into(),
            format: ResponseFormat::Plain,
            parse_failed: false,
            verdicts,
            raw_response: String::new(),
            token_usage: TokenUsage::default(),
            duration_ms: 12,
        }
    }

    #[test]
    fn score() {
        let eval = make_evaluation(&[Outcome::Correct, Outcome::Incorrect, Outcome::Correct]);
        assert_eq!(eval.total(), 3);
        assert_eq!(eval.correct_count(), 2);
        assert_eq!(eval.score_percent(), 67);
        assert_eq!(score_percent(0, 0), 0);
        assert_eq!(score_percent(5, 5), 100);
    }

    #[test]
    fn json_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("evaluation.json");
        let eval = make_evaluation(&[Outcome::Correct]);
        eval.save_json(&path).unwrap();

        let loaded = QuizEvaluation::load_json(&path).unwrap();
        assert_eq!(loaded.verdicts, eval.verdicts);
        assert_eq!(loaded.service, AiService::OpenAi);
        assert_eq!(loaded.format, ResponseFormat::Plain);
    }

    #[test]
    fn load_missing_file_fails() {
        let err = QuizEvaluation::load_json(Path::new("no/such/evaluation.json")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read evaluation"));
    }
}
