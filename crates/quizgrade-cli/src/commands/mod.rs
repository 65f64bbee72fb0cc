pub mod grade;
pub mod init;
pub mod list_models;
pub mod parse;
pub mod prompt;
pub mod settings;
pub mod test_service;

use std::path::Path;

use anyhow::{Context, Result};

use quizgrade_core::model::{AiService, QuizAnswer};

/// Read a JSON array of answered questions.
pub fn load_answers(path: &Path) -> Result<Vec<QuizAnswer>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers: {}", path.display()))?;
    let answers: Vec<QuizAnswer> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers: {}", path.display()))?;
    anyhow::ensure!(!answers.is_empty(), "{} contains no answers", path.display());
    Ok(answers)
}

/// Parse a `--service` value, or fall back to `default`.
pub fn resolve_service(arg: Option<&str>, default: AiService) -> Result<AiService> {
    match arg {
        Some(s) => s.parse::<AiService>().map_err(anyhow::Error::msg),
        None => Ok(default),
    }
}
