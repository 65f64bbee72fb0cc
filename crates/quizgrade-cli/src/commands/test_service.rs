//! The `quizgrade test-service` command.

use std::path::PathBuf;

use anyhow::Result;

use quizgrade_core::grader::QuizGrader;
use quizgrade_core::model::QuizAnswer;
use quizgrade_providers::config::load_config_from;
use quizgrade_providers::create_provider;

use super::resolve_service;
use crate::display::print_verdicts;

/// One answer a grader should accept and one it should reject.
fn sample_answers() -> Vec<QuizAnswer> {
    vec![
        QuizAnswer::new("What is the capital of France?", "Paris", "paris"),
        QuizAnswer::new("What color is the sky?", "Blue", "t"),
    ]
}

pub async fn execute(
    service: Option<String>,
    config_path: Option<PathBuf>,
    settings_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let settings = config.settings_store(settings_path.as_deref()).load();
    let service = resolve_service(service.as_deref(), settings.current_service)?;

    let provider = create_provider(config.provider_for(service)?)?;
    let grader = QuizGrader::new(provider, service, config.grader_config());

    println!(
        "Testing {service} with model {}",
        service.resolve_model(settings.model_for(service))
    );

    let evaluation = grader.grade_with_settings(&settings, &sample_answers()).await?;

    println!("\nRaw response ({}ms):", evaluation.duration_ms);
    println!("{}", evaluation.raw_response);
    println!();
    print_verdicts(&evaluation.verdicts);

    if evaluation.parse_failed {
        println!("\nParsing FAILED: check the {service} prompt format.");
    } else {
        println!("\nService OK ({} format)", evaluation.format);
    }

    Ok(())
}
