//! The `quizgrade grade` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use quizgrade_core::grader::QuizGrader;
use quizgrade_core::model::Verdict;
use quizgrade_core::prompt::has_placeholder;
use quizgrade_core::similarity::grade_locally;
use quizgrade_providers::config::load_config_from;
use quizgrade_providers::create_provider;

use super::{load_answers, resolve_service};
use crate::display::{print_score, print_verdicts};
use crate::OutputFormat;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    answers_path: PathBuf,
    service: Option<String>,
    model: Option<String>,
    offline: bool,
    output: Option<PathBuf>,
    format: OutputFormat,
    config_path: Option<PathBuf>,
    settings_path: Option<PathBuf>,
) -> Result<()> {
    let answers = load_answers(&answers_path)?;

    if offline {
        let verdicts = grade_locally(&answers);
        // No service reply exists offline, so the saved file is the verdict
        // list rather than an evaluation record.
        if let Some(path) = &output {
            save_verdicts(path, &verdicts)?;
            eprintln!("Verdicts saved to: {}", path.display());
        }
        if format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&verdicts)?);
        } else {
            eprintln!("Graded {} answers locally", answers.len());
            print_verdicts(&verdicts);
            print_score(&verdicts);
        }
        return Ok(());
    }

    let config = load_config_from(config_path.as_deref())?;
    let store = config.settings_store(settings_path.as_deref());
    let settings = store.load();
    let service = resolve_service(service.as_deref(), settings.current_service)?;

    let template = settings.prompt_for(service);
    if !has_placeholder(template) {
        eprintln!(
            "Warning: the {service} prompt has no {{QUESTIONS_PLACEHOLDER}} marker; answers will not be sent."
        );
    }
    let model = model.unwrap_or_else(|| settings.model_for(service).to_string());
    tracing::debug!(
        %service,
        %model,
        settings = %store.path().display(),
        "resolved grading settings"
    );

    let provider = create_provider(config.provider_for(service)?)?;
    let grader = QuizGrader::new(provider, service, config.grader_config());

    eprintln!("Grading {} answers with {service}...", answers.len());
    let evaluation = grader.grade(template, &model, &answers).await?;

    if evaluation.parse_failed {
        eprintln!("Warning: the grading reply could not be parsed; all answers marked incorrect.");
    }

    if let Some(path) = &output {
        evaluation.save_json(path)?;
        eprintln!("Evaluation saved to: {}", path.display());
    }

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        eprintln!(
            "Model: {} ({} format, {}ms)",
            evaluation.model, evaluation.format, evaluation.duration_ms
        );
        print_verdicts(&evaluation.verdicts);
        print_score(&evaluation.verdicts);
    }

    Ok(())
}

fn save_verdicts(path: &Path, verdicts: &[Verdict]) -> Result<()> {
    let json = serde_json::to_string_pretty(verdicts).context("failed to serialize verdicts")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write verdicts to {}", path.display()))
}
