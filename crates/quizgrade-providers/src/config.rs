//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizgrade_core::grader::GraderConfig;
use quizgrade_core::model::AiService;
use quizgrade_core::settings::SettingsStore;
use quizgrade_core::traits::LlmProvider;

use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;

/// Configuration for a single grading service.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl ProviderConfig {
    /// The service this entry configures.
    pub fn service(&self) -> AiService {
        match self {
            ProviderConfig::OpenAI { .. } => AiService::OpenAi,
            ProviderConfig::Gemini { .. } => AiService::Gemini,
        }
    }

    fn api_key(&self) -> &str {
        match self {
            ProviderConfig::OpenAI { api_key, .. } | ProviderConfig::Gemini { api_key, .. } => {
                api_key
            }
        }
    }

    fn empty_for(service: AiService) -> Self {
        match service {
            AiService::OpenAi => ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            },
            AiService::Gemini => ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            },
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

/// Top-level quizgrade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizgradeConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Where grading settings are stored. Defaults to
    /// `~/.config/quizgrade/settings.json`.
    #[serde(default)]
    pub settings_path: Option<PathBuf>,
    /// Max retries on transient provider errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}

impl Default for QuizgradeConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            settings_path: None,
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl QuizgradeConfig {
    /// Find the provider entry for `service`.
    ///
    /// An entry keyed by the service name wins; otherwise the first entry of
    /// the matching type is used.
    pub fn provider_for(&self, service: AiService) -> Result<&ProviderConfig> {
        self.provider_name_for(service)
            .and_then(|name| self.providers.get(name))
            .with_context(|| {
                format!(
                    "no {service} provider configured; set {} or add [providers.{service}] to quizgrade.toml",
                    env_key_for(service)
                )
            })
    }

    fn provider_name_for(&self, service: AiService) -> Option<&str> {
        if let Some((name, _)) = self
            .providers
            .get_key_value(service.as_str())
            .filter(|(_, c)| c.service() == service)
        {
            return Some(name);
        }

        self.providers
            .iter()
            .filter(|(_, c)| c.service() == service)
            .map(|(name, _)| name.as_str())
            .min()
    }

    /// Services with a provider entry.
    pub fn configured_services(&self) -> Vec<AiService> {
        AiService::ALL
            .into_iter()
            .filter(|s| self.providers.values().any(|c| c.service() == *s))
            .collect()
    }

    /// Settings store at `override_path`, the configured path, or the default location.
    pub fn settings_store(&self, override_path: Option<&Path>) -> SettingsStore {
        match override_path.or(self.settings_path.as_deref()) {
            Some(path) => SettingsStore::new(path),
            None => SettingsStore::default_location(),
        }
    }

    /// Grader settings derived from the retry options.
    pub fn grader_config(&self) -> GraderConfig {
        GraderConfig {
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            ..GraderConfig::default()
        }
    }
}

/// Environment variable that overrides the API key of `service`.
pub fn env_key_for(service: AiService) -> &'static str {
    match service {
        AiService::OpenAi => "QUIZGRADE_OPENAI_KEY",
        AiService::Gemini => "QUIZGRADE_GEMINI_KEY",
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again, so a value containing `${...}`
/// is kept literally. An unterminated `${` is left as is.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizgrade.toml` in the current directory
/// 2. `~/.config/quizgrade/config.toml`
///
/// Environment variable overrides: `QUIZGRADE_OPENAI_KEY`, `QUIZGRADE_GEMINI_KEY`.
pub fn load_config() -> Result<QuizgradeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizgradeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizgrade.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizgradeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizgradeConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());

    // Resolve env vars in all provider configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

fn apply_env_overrides(config: &mut QuizgradeConfig, lookup: impl Fn(&str) -> Option<String>) {
    for service in AiService::ALL {
        let Some(key) = lookup(env_key_for(service)) else {
            continue;
        };

        // Only an entry of the matching type takes the key. A name taken by
        // another type gets a separate entry.
        let name = match config.provider_name_for(service) {
            Some(name) => name.to_string(),
            None if config.providers.contains_key(service.as_str()) => format!("{service}-env"),
            None => service.as_str().to_string(),
        };
        let entry = config
            .providers
            .entry(name)
            .or_insert_with(|| ProviderConfig::empty_for(service));
        match entry {
            ProviderConfig::OpenAI { api_key, .. } | ProviderConfig::Gemini { api_key, .. } => {
                *api_key = key;
            }
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizgrade"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>> {
    if config.api_key().trim().is_empty() {
        anyhow::bail!("{} API key not configured", config.service());
    }

    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Ok(Arc::new(OpenAiProvider::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
        ))),
        ProviderConfig::Gemini { api_key, base_url } => {
            Ok(Arc::new(GeminiProvider::new(api_key, base_url.clone())))
        }
    }
}
