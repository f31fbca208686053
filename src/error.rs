use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Classification of a single failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// HTTP 429.
    RateLimited,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 403.
    Forbidden,
    /// HTTP 400. The provider rejected the request itself.
    BadRequest,
    /// HTTP 5xx.
    ServerError,
    /// The request did not complete within the client timeout.
    Timeout,
    /// The connection could not be established.
    ConnectionError,
    /// A 2xx response without usable `choices[0].message.content`.
    InvalidResponseShape,
    /// No credential configured; no request was sent.
    MissingCredential,
    /// Anything else (unexpected status codes, body read failures).
    Unknown,
}

impl ProviderErrorKind {
    /// Whether retrying the same request later could plausibly succeed.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ServerError | Self::Timeout | Self::ConnectionError
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::BadRequest => "bad_request",
            Self::ServerError => "server_error",
            Self::Timeout => "timeout",
            Self::ConnectionError => "connection_error",
            Self::InvalidResponseShape => "invalid_response_shape",
            Self::MissingCredential => "missing_credential",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call to one provider.
///
/// Returned by [`Backend`](crate::backend::Backend) implementations. The
/// orchestrator inspects [`kind`](Self::kind) and [`retry_after`](Self::retry_after)
/// to decide how to continue.
#[derive(Error, Debug, Clone)]
#[error("{provider} {kind}: {message}")]
pub struct ProviderError {
    /// Name of the provider that failed.
    pub provider: String,
    /// Failure classification.
    pub kind: ProviderErrorKind,
    /// Retry-After hint, set for [`ProviderErrorKind::RateLimited`].
    pub retry_after: Option<Duration>,
    /// Raw diagnostic text (response body or transport error).
    pub message: String,
}

impl ProviderError {
    pub fn new(
        provider: impl Into<String>,
        kind: ProviderErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            kind,
            retry_after: None,
            message: message.into(),
        }
    }

    /// A rate-limit error carrying the provider's Retry-After hint.
    pub fn rate_limited(
        provider: impl Into<String>,
        retry_after: Duration,
        message: impl Into<String>,
    ) -> Self {
        Self {
            retry_after: Some(retry_after),
            ..Self::new(provider, ProviderErrorKind::RateLimited, message)
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind == ProviderErrorKind::RateLimited
    }
}

/// Errors produced by the planner and its components.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// A single provider failed and there was nothing to fall back to.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Every configured provider failed. Failures are kept in attempt order.
    #[error("all providers failed: {}", join_failures(.failures))]
    AllProvidersFailed { failures: Vec<ProviderError> },

    /// A completion request violated its input constraints.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid configuration detected at build time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A TOML configuration document failed to parse.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

fn join_failures(failures: &[ProviderError]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.provider, f.message))
        .collect::<Vec<_>>()
        .join(" | ")
}

pub type Result<T> = std::result::Result<T, PlannerError>;
