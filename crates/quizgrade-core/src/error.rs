//! Error types shared across quizgrade crates.
//!
//! `ProviderError` lives here rather than in `quizgrade-providers` so the
//! grader can downcast and classify errors for retry decisions without
//! string matching.

use thiserror::Error;

/// Errors that can occur when interacting with a text-generation service.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The service answered with an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Why a grading response could not be mapped onto the submitted answers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// The response contained no text at all.
    #[error("evaluation response is empty")]
    EmptyResponse,

    /// Fewer question blocks than answers were found.
    #[error("expected {expected} question blocks, found {found}")]
    MissingBlocks { expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_errors() {
        assert!(ProviderError::AuthenticationFailed("bad key".into()).is_permanent());
        assert!(ProviderError::ModelNotFound("gpt-9".into()).is_permanent());
        assert!(!ProviderError::Timeout(120).is_permanent());
        assert!(!ProviderError::ApiError {
            status: 500,
            message: "boom".into()
        }
        .is_permanent());
    }

    #[test]
    fn retry_after_only_for_rate_limits() {
        let limited = ProviderError::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(limited.retry_after_ms(), Some(5000));
        assert_eq!(limited.to_string(), "rate limited, retry after 5000ms");
        assert_eq!(ProviderError::NetworkError("x".into()).retry_after_ms(), None);
    }

    #[test]
    fn parse_failure_messages() {
        let err = ParseFailure::MissingBlocks {
            expected: 3,
            found: 1,
        };
        assert_eq!(err.to_string(), "expected 3 question blocks, found 1");
    }
}
