//! The `quizgrade settings` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quizgrade_core::model::AiService;
use quizgrade_core::prompt::has_placeholder;
use quizgrade_core::settings::AiSettings;
use quizgrade_providers::config::load_config_from;

use crate::{OutputFormat, SettingsAction};

pub fn execute(
    action: SettingsAction,
    config_path: Option<PathBuf>,
    settings_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = config.settings_store(settings_path.as_deref());

    match action {
        SettingsAction::Show { format } => {
            let settings = store.load();
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                println!("Settings file: {}", store.path().display());
                print_settings(&settings);
            }
        }
        SettingsAction::Use { service } => {
            let service = parse_service(&service)?;
            let mut settings = store.load();
            settings.current_service = service;
            store.save(&settings)?;
            println!("Grading service set to {service}");
        }
        SettingsAction::Model { service, model } => {
            let service = parse_service(&service)?;
            let mut settings = store.load();
            settings.set_model(service, model.trim());
            store.save(&settings)?;
            println!(
                "Model for {service} set to {}",
                service.resolve_model(settings.model_for(service))
            );
        }
        SettingsAction::Prompt { service, file } => {
            let service = parse_service(&service)?;
            let template = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read prompt: {}", file.display()))?;
            if !has_placeholder(&template) {
                eprintln!(
                    "Warning: {} has no {{QUESTIONS_PLACEHOLDER}} marker; answers will not be sent.",
                    file.display()
                );
            }
            let mut settings = store.load();
            settings.set_prompt(service, template);
            store.save(&settings)?;
            println!("Prompt for {service} updated");
        }
        SettingsAction::Reset => {
            store.reset()?;
            println!("Settings reset to defaults");
        }
        SettingsAction::Validate => {
            let warnings = store.load().validate();
            for w in &warnings {
                println!("  [{}] WARNING: {}", w.service, w.message);
            }
            if warnings.is_empty() {
                println!("Settings valid.");
            } else {
                println!("\n{} warning(s) found.", warnings.len());
            }
        }
    }

    Ok(())
}

fn parse_service(s: &str) -> Result<AiService> {
    s.parse::<AiService>().map_err(anyhow::Error::msg)
}

fn print_settings(settings: &AiSettings) {
    let mut table = Table::new();
    table.set_header(vec!["Service", "Active", "Model", "Prompt"]);

    for service in AiService::ALL {
        let prompt = settings.prompt_for(service);
        let first_line: String = prompt.lines().next().unwrap_or("").chars().take(60).collect();
        let summary = format!("{} chars: {first_line}", prompt.chars().count());
        table.add_row(vec![
            Cell::new(service),
            Cell::new(if service == settings.current_service { "*" } else { "" }),
            Cell::new(settings.model_for(service)),
            Cell::new(summary),
        ]);
    }

    println!("{table}");
}
