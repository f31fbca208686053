//! Rate-limit waiting policy for the fallback chain.
//!
//! Earlier tiers never wait: a rate-limited provider is skipped at once. Only
//! the last tier, with nothing left to fall back to, pauses before the chain
//! gives up. [`BackoffConfig`] bounds that pause.

use serde::Deserialize;
use std::time::Duration;

/// Bounds for the single rate-limit pause on the last provider tier.
///
/// # Example
///
/// ```
/// use content_planner::backend::BackoffConfig;
/// use std::time::Duration;
///
/// let standard = BackoffConfig::standard();
/// assert_eq!(standard.wait_for(Some(Duration::from_secs(120))), Duration::from_secs(30));
///
/// let none = BackoffConfig::none();
/// assert_eq!(none.wait_for(Some(Duration::from_secs(5))), Duration::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Upper bound on the pause. Default: 30 seconds.
    #[serde(deserialize_with = "secs::deserialize")]
    pub max_wait: Duration,

    /// Pause used when the provider sent no Retry-After hint. Default: 60
    /// seconds, which the cap then reduces to `max_wait`.
    #[serde(deserialize_with = "secs::deserialize")]
    pub default_retry_after: Duration,
}

impl BackoffConfig {
    /// 30 second cap, 60 second assumed Retry-After.
    pub fn standard() -> Self {
        Self {
            max_wait: Duration::from_secs(30),
            default_retry_after: Duration::from_secs(60),
        }
    }

    /// Never pause. Useful for tests and batch callers that throttle themselves.
    pub fn none() -> Self {
        Self {
            max_wait: Duration::ZERO,
            ..Self::standard()
        }
    }

    /// Set the pause cap.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// The pause for a rate-limit error carrying `retry_after`.
    pub fn wait_for(&self, retry_after: Option<Duration>) -> Duration {
        retry_after
            .unwrap_or(self.default_retry_after)
            .min(self.max_wait)
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Durations as whole seconds in configuration files.
mod secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
