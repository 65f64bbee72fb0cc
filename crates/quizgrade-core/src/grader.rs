//! Quiz grading orchestrator.
//!
//! Formats the grading prompt, sends it to the selected service with
//! retries on transient failures, and parses the reply into verdicts.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ProviderError;
use crate::evaluation::analyze_response;
use crate::model::{AiService, QuizAnswer};
use crate::prompt::{format_prompt, has_placeholder};
use crate::report::QuizEvaluation;
use crate::settings::AiSettings;
use crate::traits::{GenerateRequest, GenerateResponse, LlmProvider};

/// Configuration for the grader.
#[derive(Debug, Clone)]
pub struct GraderConfig {
    /// Temperature for generation.
    pub temperature: f64,
    /// Max tokens for generation.
    pub max_tokens: u32,
    /// Retries on transient provider errors.
    pub max_retries: u32,
    /// Delay before the first retry; doubled after each attempt.
    pub retry_delay: Duration,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 4000,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Grades completed quizzes with one text-generation service.
pub struct QuizGrader {
    provider: Arc<dyn LlmProvider>,
    service: AiService,
    config: GraderConfig,
}

impl QuizGrader {
    pub fn new(provider: Arc<dyn LlmProvider>, service: AiService, config: GraderConfig) -> Self {
        Self {
            provider,
            service,
            config,
        }
    }

    pub fn service(&self) -> AiService {
        self.service
    }

    /// Grade with the prompt and model that `settings` hold for this service.
    pub async fn grade_with_settings(
        &self,
        settings: &AiSettings,
        answers: &[QuizAnswer],
    ) -> Result<QuizEvaluation> {
        self.grade(
            settings.prompt_for(self.service),
            settings.model_for(self.service),
            answers,
        )
        .await
    }

    /// Grade `answers` using `template` and `model`.
    ///
    /// Provider failures are returned as errors. An unparseable reply is not
    /// an error: the evaluation then holds fallback verdicts and
    /// `parse_failed` is set.
    #[instrument(
        skip(self, template, answers),
        fields(service = %self.service, answers = answers.len())
    )]
    pub async fn grade(
        &self,
        template: &str,
        model: &str,
        answers: &[QuizAnswer],
    ) -> Result<QuizEvaluation> {
        anyhow::ensure!(!answers.is_empty(), "no answers to grade");

        if !has_placeholder(template) {
            tracing::warn!(
                "prompt template has no placeholder; answers are not part of the prompt"
            );
        }
        let prompt = format_prompt(template, answers);
        anyhow::ensure!(!prompt.trim().is_empty(), "prompt is required");

        let request = GenerateRequest {
            model: self.service.resolve_model(model),
            prompt,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        tracing::info!(
            model = %request.model,
            prompt_chars = request.prompt.len(),
            "starting AI evaluation"
        );

        let start = Instant::now();
        let response = self
            .generate_with_retries(&request)
            .await
            .with_context(|| format!("AI evaluation failed using {}", self.service))?;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            duration_ms,
            response_chars = response.content.len(),
            "AI evaluation completed"
        );

        let parsed = analyze_response(&response.content, answers);

        Ok(QuizEvaluation {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            service: self.service,
            model: request.model,
            format: parsed.format,
            parse_failed: parsed.is_fallback(),
            verdicts: parsed.verdicts,
            raw_response: response.content,
            token_usage: response.token_usage,
            duration_ms,
        })
    }

    /// Call the provider, retrying transient errors with exponential backoff.
    async fn generate_with_retries(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let mut last_error = None;
        let mut retry_delay = self.config.retry_delay;

        for retry in 0..=self.config.max_retries {
            if retry > 0 {
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(Duration::from_secs(60));
            }

            match self.provider.generate(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if let Some(provider_error) = e.downcast_ref::<ProviderError>() {
                        if provider_error.is_permanent() {
                            return Err(e);
                        }
                        if let Some(ms) = provider_error.retry_after_ms() {
                            retry_delay = Duration::from_millis(ms);
                        }
                    }
                    tracing::warn!(attempt = retry + 1, "grading request failed: {e:#}");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("unknown error")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::evaluation::ResponseFormat;
    use crate::model::Outcome;
    use crate::traits::{ModelInfo, TokenUsage};

    /// Replays queued replies. A final successful reply is repeated.
    struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<String, ProviderError>>>,
        calls: AtomicU32,
        last_request: Mutex<Option<GenerateRequest>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicU32::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            *self.last_request.lock().unwrap() = Some(request.clone());

            let reply = {
                let mut replies = self.replies.lock().unwrap();
                match replies.pop_front() {
                    Some(Ok(text)) if replies.is_empty() => {
                        replies.push_back(Ok(text.clone()));
                        Some(Ok(text))
                    }
                    other => other,
                }
            };

            match reply {
                Some(Ok(content)) => Ok(GenerateResponse {
                    content,
                    model: request.model.clone(),
                    token_usage: TokenUsage::default(),
                    latency_ms: 1,
                }),
                Some(Err(e)) => Err(e.into()),
                None => Err(anyhow::anyhow!("no scripted reply")),
            }
        }

        fn available_models(&self) -> Vec<ModelInfo> {
            vec![]
        }
    }

    fn answers() -> Vec<QuizAnswer> {
        vec![
            QuizAnswer::new("What is the capital of France?", "Paris", "paris"),
            QuizAnswer::new("What color is the sky?", "Blue", "t"),
        ]
    }

    const REPLY: &str = "Question: What is the capital of France?\nResult: Correct\nJustification: Case does not matter.\n\nQuestion: What color is the sky?\nResult: Incorrect\nJustification: Not a color.";

    fn fast_config() -> GraderConfig {
        GraderConfig {
            retry_delay: Duration::from_millis(10),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn grades_answers() {
        let provider = ScriptedProvider::new(vec![Ok(REPLY.to_string())]);
        let grader = QuizGrader::new(provider.clone(), AiService::OpenAi, fast_config());

        let eval = grader
            .grade("Grade:\n{QUESTIONS_PLACEHOLDER}", "", &answers())
            .await
            .unwrap();

        assert_eq!(eval.model, "gpt-4o-mini");
        assert_eq!(eval.format, ResponseFormat::Plain);
        assert!(!eval.parse_failed);
        assert_eq!(eval.verdicts[0].result, Outcome::Correct);
        assert_eq!(eval.verdicts[1].result, Outcome::Incorrect);
        assert_eq!(eval.correct_count(), 1);
        assert_eq!(eval.raw_response, REPLY);

        let request = provider.last_request.lock().unwrap().clone().unwrap();
        assert!(request.prompt.starts_with("Grade:\n1. Question: What is the capital of France?"));
        assert_eq!(request.max_tokens, 4000);
        assert!((request.temperature - 0.1).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn uses_settings_for_service() {
        let provider = ScriptedProvider::new(vec![Ok(REPLY.to_string())]);
        let grader = QuizGrader::new(provider.clone(), AiService::Gemini, fast_config());

        let eval = grader
            .grade_with_settings(&AiSettings::default(), &answers())
            .await
            .unwrap();

        assert_eq!(eval.service, AiService::Gemini);
        assert_eq!(eval.model, "gemini-2.0-flash-lite");
        let request = provider.last_request.lock().unwrap().clone().unwrap();
        assert!(request.prompt.contains("Write all justifications in Serbian language."));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderError::Timeout(120)),
            Err(ProviderError::RateLimited {
                retry_after_ms: 2000,
            }),
            Ok(REPLY.to_string()),
        ]);
        let grader = QuizGrader::new(provider.clone(), AiService::OpenAi, fast_config());

        let eval = grader
            .grade("{QUESTIONS_PLACEHOLDER}", "gpt-4o", &answers())
            .await
            .unwrap();
        assert_eq!(provider.calls(), 3);
        assert_eq!(eval.model, "gpt-4o");
    }

    #[tokio::test]
    async fn permanent_errors_fail_fast() {
        let provider =
            ScriptedProvider::new(vec![Err(ProviderError::AuthenticationFailed("bad key".into()))]);
        let grader = QuizGrader::new(provider.clone(), AiService::OpenAi, fast_config());

        let err = grader
            .grade("{QUESTIONS_PLACEHOLDER}", "", &answers())
            .await
            .unwrap_err();
        assert_eq!(provider.calls(), 1);
        let msg = format!("{err:#}");
        assert!(msg.contains("AI evaluation failed using openai"), "{msg}");
        assert!(msg.contains("authentication failed"), "{msg}");
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let provider = ScriptedProvider::new(vec![Err(ProviderError::ApiError {
            status: 500,
            message: "internal error".into(),
        })]);
        let config = GraderConfig {
            max_retries: 2,
            ..fast_config()
        };
        let grader = QuizGrader::new(provider.clone(), AiService::Gemini, config);

        let err = grader
            .grade("{QUESTIONS_PLACEHOLDER}", "", &answers())
            .await
            .unwrap_err();
        assert_eq!(provider.calls(), 3);
        assert!(format!("{err:#}").contains("AI evaluation failed using gemini"));
    }

    #[tokio::test]
    async fn unparseable_reply_uses_fallback() {
        let provider = ScriptedProvider::new(vec![Ok("I cannot grade this.".to_string())]);
        let grader = QuizGrader::new(provider, AiService::OpenAi, fast_config());

        let eval = grader
            .grade("{QUESTIONS_PLACEHOLDER}", "", &answers())
            .await
            .unwrap();
        assert!(eval.parse_failed);
        assert_eq!(eval.verdicts.len(), 2);
        assert_eq!(
            eval.verdicts[1].justification.as_deref(),
            Some("Parsing failed - Question 2")
        );
    }

    #[tokio::test]
    async fn rejects_empty_input() {
        let provider = ScriptedProvider::new(vec![Ok(REPLY.to_string())]);
        let grader = QuizGrader::new(provider.clone(), AiService::OpenAi, fast_config());

        assert!(grader.grade("{QUESTIONS_PLACEHOLDER}", "", &[]).await.is_err());
        let err = grader.grade("  ", "", &answers()).await.unwrap_err();
        assert!(err.to_string().contains("prompt is required"));
        assert_eq!(provider.calls(), 0);
    }
}
