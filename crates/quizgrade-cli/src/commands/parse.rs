//! The `quizgrade parse` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizgrade_core::evaluation::analyze_response;

use super::load_answers;
use crate::display::{print_score, print_verdicts};
use crate::OutputFormat;

pub fn execute(response_path: PathBuf, answers_path: PathBuf, format: OutputFormat) -> Result<()> {
    let answers = load_answers(&answers_path)?;
    let raw = std::fs::read_to_string(&response_path)
        .with_context(|| format!("failed to read response: {}", response_path.display()))?;

    let parsed = analyze_response(&raw, &answers);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&parsed.verdicts)?);
        return Ok(());
    }

    println!("Format: {}", parsed.format);
    if let Some(failure) = &parsed.failure {
        println!("Parsing failed: {failure}");
    }
    print_verdicts(&parsed.verdicts);
    print_score(&parsed.verdicts);

    Ok(())
}
