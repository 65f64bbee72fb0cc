//! The `quizgrade list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use quizgrade_core::model::AiService;
use quizgrade_providers::create_provider;

pub fn execute(service_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = quizgrade_providers::config::load_config_from(config_path.as_deref())?;

    let filter = service_filter
        .as_deref()
        .map(str::parse::<AiService>)
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let mut found_any = false;

    for service in config.configured_services() {
        if filter.is_some_and(|f| f != service) {
            continue;
        }

        let provider = create_provider(config.provider_for(service)?)?;
        let models = provider.available_models();

        if !models.is_empty() {
            found_any = true;
            println!("Service: {service}");
            for model in &models {
                println!(
                    "  {}: {} ({}K context)",
                    model.id,
                    model.name,
                    model.max_context / 1000,
                );
            }
            println!();
        }
    }

    if !found_any {
        println!("No services configured. Run `quizgrade init` to create a config file.");
    }

    Ok(())
}
