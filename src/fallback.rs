//! Ordered provider fallback.
//!
//! [`FallbackChain`] calls each provider tier at most once, in order, and
//! returns the first success. Every failure moves on to the next tier; a
//! rate limit on an earlier tier moves on without waiting. Only when the last
//! tier is rate limited does the chain pause, once, for
//! `min(retry_after, max_wait)` before giving up. No request is repeated.
//!
//! ```text
//!   tier 0 ──ok──► result
//!     │ err (any kind, no wait)
//!   tier 1 ──ok──► result
//!     │ err
//!     ├── rate limited ──► sleep min(retry_after, 30s) ──► AllProvidersFailed
//!     └── other ─────────────────────────────────────────► AllProvidersFailed
//! ```

use crate::backend::{
    Backend, BackoffConfig, CompletionRequest, CompletionResult, OpenAiBackend,
};
use crate::config::PlannerConfig;
use crate::error::{PlannerError, ProviderError, Result};
use crate::events::{emit, Event, EventHandler};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Provider tiers tried in priority order.
///
/// # Example
///
/// ```
/// use content_planner::backend::MockBackend;
/// use content_planner::fallback::FallbackChain;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let chain = FallbackChain::builder()
///     .provider(Arc::new(MockBackend::fixed("primary", "hello")))
///     .provider(Arc::new(MockBackend::fixed("secondary", "hi")))
///     .build()
///     .unwrap();
///
/// let result = chain.call_with_fallback("Say hello", 16, 0.2).await.unwrap();
/// assert_eq!(result.provider, "primary");
/// # });
/// ```
#[derive(Clone)]
pub struct FallbackChain {
    providers: Vec<Arc<dyn Backend>>,
    backoff: BackoffConfig,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl std::fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackChain")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("backoff", &self.backoff)
            .field("has_event_handler", &self.event_handler.is_some())
            .finish()
    }
}

impl FallbackChain {
    /// Create a new builder.
    pub fn builder() -> FallbackChainBuilder {
        FallbackChainBuilder {
            providers: Vec::new(),
            backoff: None,
            event_handler: None,
        }
    }

    /// Build one [`OpenAiBackend`] per configured tier.
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        config.validate()?;
        let mut builder = Self::builder().backoff(config.backoff.clone());
        for provider in &config.providers {
            builder = builder.provider(Arc::new(OpenAiBackend::from_config(provider)?));
        }
        builder.build()
    }

    /// Providers in fallback order.
    pub fn providers(&self) -> &[Arc<dyn Backend>] {
        &self.providers
    }

    pub fn backoff(&self) -> &BackoffConfig {
        &self.backoff
    }

    /// Build a request and run it through the chain.
    pub async fn call_with_fallback(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<CompletionResult> {
        let request = CompletionRequest::new(prompt, max_tokens, temperature)?;
        self.complete(&request).await
    }

    /// Run `request` through the tiers in order.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult> {
        let mut failures: Vec<ProviderError> = Vec::with_capacity(self.providers.len());
        let last = self.providers.len().saturating_sub(1);

        for (tier, backend) in self.providers.iter().enumerate() {
            let provider = backend.name().to_string();
            emit(
                &self.event_handler,
                Event::Attempt {
                    provider: provider.clone(),
                    tier,
                },
            );
            debug!(provider = %provider, tier, "attempting provider");

            let err = match backend.complete(&request.targeting(&provider)).await {
                Ok(result) => {
                    if tier > 0 {
                        info!(provider = %provider, tier, "fallback provider succeeded");
                    }
                    emit(&self.event_handler, Event::Succeeded { provider });
                    return Ok(result);
                }
                Err(err) => err,
            };

            warn!(
                provider = %provider,
                kind = %err.kind,
                transient = err.is_transient(),
                "provider call failed: {}",
                err.message
            );
            emit(
                &self.event_handler,
                Event::ProviderFailed {
                    provider: provider.clone(),
                    kind: err.kind,
                    message: err.message.clone(),
                },
            );

            if tier == last && err.is_rate_limited() {
                let wait = self.backoff.wait_for(err.retry_after);
                warn!(
                    provider = %provider,
                    wait_ms = wait.as_millis() as u64,
                    "last provider rate limited, pausing before giving up"
                );
                emit(
                    &self.event_handler,
                    Event::RateLimitWait {
                        provider: provider.clone(),
                        wait,
                    },
                );
                tokio::time::sleep(wait).await;
            } else if tier < last {
                info!(
                    from = %provider,
                    to = %self.providers[tier + 1].name(),
                    "falling back to next provider"
                );
            }

            failures.push(err);
        }

        emit(
            &self.event_handler,
            Event::Exhausted {
                attempts: failures.len(),
            },
        );
        Err(PlannerError::AllProvidersFailed { failures })
    }
}

/// Builder for [`FallbackChain`].
pub struct FallbackChainBuilder {
    providers: Vec<Arc<dyn Backend>>,
    backoff: Option<BackoffConfig>,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl FallbackChainBuilder {
    /// Append a provider tier. The first one added is the primary.
    pub fn provider(mut self, backend: Arc<dyn Backend>) -> Self {
        self.providers.push(backend);
        self
    }

    /// Set the rate-limit policy. Default: [`BackoffConfig::standard()`].
    pub fn backoff(mut self, config: BackoffConfig) -> Self {
        self.backoff = Some(config);
        self
    }

    /// Set the event handler.
    pub fn event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Build the chain. Fails without at least one provider.
    pub fn build(self) -> Result<FallbackChain> {
        if self.providers.is_empty() {
            return Err(PlannerError::InvalidConfig(
                "fallback chain needs at least one provider".into(),
            ));
        }
        Ok(FallbackChain {
            providers: self.providers,
            backoff: self.backoff.unwrap_or_else(BackoffConfig::standard),
            event_handler: self.event_handler,
        })
    }
}
