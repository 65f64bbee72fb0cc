//! Persisted grading settings.
//!
//! Which service grades answers, and the model and prompt template used for
//! each service. Settings are stored as JSON; anything missing from the
//! stored file is filled in from the defaults on load.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::AiService;
use crate::prompt::{has_placeholder, DELIMITED_RUBRIC, PLAIN_RUBRIC, QUESTIONS_PLACEHOLDER};

/// Prompt template per service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePrompts {
    pub openai: String,
    pub gemini: String,
}

impl Default for ServicePrompts {
    fn default() -> Self {
        Self {
            openai: PLAIN_RUBRIC.to_string(),
            gemini: DELIMITED_RUBRIC.to_string(),
        }
    }
}

/// Model id per service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceModels {
    pub openai: String,
    pub gemini: String,
}

impl Default for ServiceModels {
    fn default() -> Self {
        Self {
            openai: "gpt-4o-mini".to_string(),
            gemini: "gemini-2.0-flash-lite".to_string(),
        }
    }
}

/// Grading settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiSettings {
    /// Service used for grading.
    pub current_service: AiService,
    pub prompts: ServicePrompts,
    pub models: ServiceModels,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            current_service: AiService::OpenAi,
            prompts: ServicePrompts::default(),
            models: ServiceModels::default(),
        }
    }
}

impl AiSettings {
    pub fn prompt_for(&self, service: AiService) -> &str {
        match service {
            AiService::OpenAi => &self.prompts.openai,
            AiService::Gemini => &self.prompts.gemini,
        }
    }

    pub fn model_for(&self, service: AiService) -> &str {
        match service {
            AiService::OpenAi => &self.models.openai,
            AiService::Gemini => &self.models.gemini,
        }
    }

    pub fn active_prompt(&self) -> &str {
        self.prompt_for(self.current_service)
    }

    pub fn active_model(&self) -> &str {
        self.model_for(self.current_service)
    }

    pub fn set_prompt(&mut self, service: AiService, prompt: impl Into<String>) {
        let slot = match service {
            AiService::OpenAi => &mut self.prompts.openai,
            AiService::Gemini => &mut self.prompts.gemini,
        };
        *slot = prompt.into();
    }

    pub fn set_model(&mut self, service: AiService, model: impl Into<String>) {
        let slot = match service {
            AiService::OpenAi => &mut self.models.openai,
            AiService::Gemini => &mut self.models.gemini,
        };
        *slot = model.into();
    }

    /// Check the settings for values that would make grading useless.
    pub fn validate(&self) -> Vec<SettingsWarning> {
        let mut warnings = Vec::new();

        for service in AiService::ALL {
            if !has_placeholder(self.prompt_for(service)) {
                warnings.push(SettingsWarning {
                    service,
                    message: format!(
                        "prompt has no {QUESTIONS_PLACEHOLDER} marker; answers will not be included"
                    ),
                });
            }
            if self.model_for(service).trim().is_empty() {
                warnings.push(SettingsWarning {
                    service,
                    message: format!(
                        "model is empty; {} will be used",
                        service.fallback_model()
                    ),
                });
            }
        }

        warnings
    }
}

/// A problem found in the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsWarning {
    pub service: AiService,
    pub message: String,
}

/// JSON file holding [`AiSettings`].
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.config/quizgrade/settings.json`, or `./settings.json`
    /// when `HOME` is unset.
    pub fn default_location() -> Self {
        let path = std::env::var("HOME")
            .ok()
            .map(|h| {
                PathBuf::from(h)
                    .join(".config")
                    .join("quizgrade")
                    .join("settings.json")
            })
            .unwrap_or_else(|| PathBuf::from("settings.json"));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, merged with the defaults.
    ///
    /// A missing, unreadable, or malformed file yields the defaults.
    pub fn load(&self) -> AiSettings {
        if !self.path.exists() {
            return AiSettings::default();
        }

        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("error loading AI settings: {e:#}");
                AiSettings::default()
            }
        }
    }

    fn try_load(&self) -> Result<AiSettings> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read settings: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse settings: {}", self.path.display()))
    }

    /// Write settings as pretty JSON, creating parent directories.
    pub fn save(&self, settings: &AiSettings) -> Result<()> {
        let json =
            serde_json::to_string_pretty(settings).context("failed to serialize settings")?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write settings to {}", self.path.display()))?;
        Ok(())
    }

    /// Remove the stored file so the defaults apply again.
    pub fn reset(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}
