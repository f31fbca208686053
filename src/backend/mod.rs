//! Backend trait and normalized request/response types.
//!
//! The [`Backend`] trait abstracts over completion providers, translating
//! between the normalized [`CompletionRequest`]/[`CompletionResult`] types and
//! a provider's HTTP API. Built-in implementations: [`OpenAiBackend`] for any
//! OpenAI-compatible chat-completions endpoint and [`MockBackend`] for tests.
//!
//! ## Architecture
//!
//! ```text
//! ContentPlanner ──► FallbackChain ──► Backend::complete() ──► CompletionResult
//!                                            │
//!                                ┌───────────┴───────────┐
//!                          OpenAiBackend            MockBackend
//!                       (openai, perplexity)      (scripted replies)
//! ```

pub mod backoff;
pub mod mock;
pub mod openai;

pub use backoff::BackoffConfig;
pub use mock::{MockBackend, MockReply};
pub use openai::OpenAiBackend;

use crate::error::{PlannerError, ProviderError, Result};
use async_trait::async_trait;

/// A normalized completion request, provider-agnostic.
///
/// Built once per operation by the planner; the orchestrator stamps the
/// target provider on a copy for each attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    prompt: String,
    max_tokens: u32,
    temperature: f64,
    provider: Option<String>,
}

impl CompletionRequest {
    /// Build a request. The prompt must be non-blank and `max_tokens` positive.
    pub fn new(prompt: impl Into<String>, max_tokens: u32, temperature: f64) -> Result<Self> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(PlannerError::InvalidRequest("prompt is empty".into()));
        }
        if max_tokens == 0 {
            return Err(PlannerError::InvalidRequest(
                "max_tokens must be positive".into(),
            ));
        }
        Ok(Self {
            prompt,
            max_tokens,
            temperature,
            provider: None,
        })
    }

    /// Copy of this request addressed to `provider`.
    pub fn targeting(&self, provider: &str) -> Self {
        Self {
            provider: Some(provider.to_string()),
            ..self.clone()
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// The provider this request was addressed to, if any.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }
}

/// Text returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    /// Trimmed content of the first completion choice.
    pub text: String,
    /// Name of the provider that produced the text.
    pub provider: String,
}

/// Abstraction over completion providers.
///
/// Implementors issue exactly one request per call and never sleep or retry;
/// that policy belongs to [`FallbackChain`](crate::fallback::FallbackChain).
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute one completion call.
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<CompletionResult, ProviderError>;

    /// Provider name for logging, diagnostics and health reports.
    fn name(&self) -> &str;

    /// Whether a credential is configured. Backends without auth report `true`.
    fn has_credential(&self) -> bool {
        true
    }
}
