//! Mock backend for testing without a live provider.
//!
//! [`MockBackend`] plays back scripted [`MockReply`] values in order, so the
//! fallback chain and planner can be exercised deterministically.
//!
//! # Example
//!
//! ```
//! use content_planner::backend::{MockBackend, MockReply};
//! use content_planner::error::ProviderErrorKind;
//!
//! let mock = MockBackend::fixed("primary", "Hello, world!");
//! let failing = MockBackend::new(
//!     "secondary",
//!     vec![MockReply::fail(ProviderErrorKind::ServerError, "HTTP 502")],
//! );
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{Backend, CompletionRequest, CompletionResult};
use crate::error::{ProviderError, ProviderErrorKind};

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Succeed with this text.
    Text(String),
    /// Fail with this kind, retry-after hint and message.
    Fail {
        kind: ProviderErrorKind,
        retry_after: Option<Duration>,
        message: String,
    },
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn fail(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self::Fail {
            kind,
            retry_after: None,
            message: message.into(),
        }
    }

    pub fn rate_limited(retry_after: Duration) -> Self {
        Self::Fail {
            kind: ProviderErrorKind::RateLimited,
            retry_after: Some(retry_after),
            message: "HTTP 429: rate limit exceeded".into(),
        }
    }
}

/// A test backend that replays scripted replies in order.
///
/// Cycles back to the beginning when all replies have been consumed.
/// Records every prompt it receives.
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    replies: Vec<MockReply>,
    index: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Create a mock with the given scripted replies.
    pub fn new(name: impl Into<String>, replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty(), "MockBackend requires at least one reply");
        Self {
            name: name.into(),
            replies,
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A mock that always succeeds with the same text.
    pub fn fixed(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, vec![MockReply::text(text)])
    }

    /// A mock that always fails with `kind`.
    pub fn failing(name: impl Into<String>, kind: ProviderErrorKind) -> Self {
        Self::new(name, vec![MockReply::fail(kind, format!("simulated {}", kind))])
    }

    /// Number of calls received so far.
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    fn next_reply(&self) -> MockReply {
        let idx = self.index.fetch_add(1, Ordering::SeqCst) % self.replies.len();
        self.replies[idx].clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResult, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt().to_string());
        }
        match self.next_reply() {
            MockReply::Text(text) => Ok(CompletionResult {
                text: text.trim().to_string(),
                provider: self.name.clone(),
            }),
            MockReply::Fail {
                kind,
                retry_after,
                message,
            } => Err(ProviderError {
                provider: self.name.clone(),
                kind,
                retry_after,
                message,
            }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest::new("test", 16, 0.5).unwrap()
    }

    #[tokio::test]
    async fn test_mock_fixed_response() {
        let mock = MockBackend::fixed("primary", "Hello!");
        let resp = mock.complete(&request()).await.unwrap();
        assert_eq!(resp.text, "Hello!");
        assert_eq!(resp.provider, "primary");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_cycles_replies() {
        let mock = MockBackend::new(
            "primary",
            vec![
                MockReply::text("first"),
                MockReply::fail(ProviderErrorKind::Timeout, "took too long"),
            ],
        );
        let r1 = mock.complete(&request()).await;
        let r2 = mock.complete(&request()).await;
        let r3 = mock.complete(&request()).await;
        assert_eq!(r1.unwrap().text, "first");
        assert_eq!(r2.unwrap_err().kind, ProviderErrorKind::Timeout);
        assert_eq!(r3.unwrap().text, "first"); // cycles
        assert_eq!(mock.prompts(), vec!["test", "test", "test"]);
    }

    #[tokio::test]
    async fn test_mock_rate_limited_hint() {
        let mock = MockBackend::new(
            "secondary",
            vec![MockReply::rate_limited(Duration::from_secs(45))],
        );
        let err = mock.complete(&request()).await.unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(err.retry_after, Some(Duration::from_secs(45)));
        assert_eq!(err.provider, "secondary");
    }
}
