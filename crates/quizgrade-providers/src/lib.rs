//! quizgrade-providers: grading service integrations.
//!
//! Implements the `LlmProvider` trait for OpenAI and Gemini, plus a mock
//! provider for tests and the config file that selects between them.

pub mod config;
pub mod gemini;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, ProviderConfig, QuizgradeConfig};
pub use quizgrade_core::error::ProviderError;
