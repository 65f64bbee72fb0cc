//! The `quizgrade prompt` command.

use std::path::PathBuf;

use anyhow::Result;

use quizgrade_core::prompt::{format_prompt, has_placeholder};
use quizgrade_providers::config::load_config_from;

use super::{load_answers, resolve_service};

pub fn execute(
    answers_path: PathBuf,
    service: Option<String>,
    config_path: Option<PathBuf>,
    settings_path: Option<PathBuf>,
) -> Result<()> {
    let answers = load_answers(&answers_path)?;
    let config = load_config_from(config_path.as_deref())?;
    let settings = config.settings_store(settings_path.as_deref()).load();
    let service = resolve_service(service.as_deref(), settings.current_service)?;

    let template = settings.prompt_for(service);
    if !has_placeholder(template) {
        eprintln!(
            "Warning: the {service} prompt has no {{QUESTIONS_PLACEHOLDER}} marker; answers are not included."
        );
    }

    println!("{}", format_prompt(template, &answers));
    Ok(())
}
