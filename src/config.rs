//! Provider and planner configuration.
//!
//! Credentials are resolved once, at startup, into an explicit
//! [`PlannerConfig`]; nothing downstream reads the process environment.
//!
//! # Example
//!
//! ```
//! use content_planner::config::PlannerConfig;
//!
//! let config = PlannerConfig::from_toml_str(r#"
//!     [[providers]]
//!     name = "openai"
//!     base_url = "https://api.openai.com"
//!     path = "/v1/chat/completions"
//!     model = "gpt-4o-mini"
//!     api_key = "sk-inline"
//! "#).unwrap();
//! assert_eq!(config.providers[0].endpoint(), "https://api.openai.com/v1/chat/completions");
//! ```

use crate::backend::openai::{redact, DEFAULT_TIMEOUT};
use crate::backend::BackoffConfig;
use crate::error::{PlannerError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// One provider tier.
#[derive(Clone, Deserialize)]
pub struct ProviderConfig {
    /// Name used in logs, errors and health reports.
    pub name: String,
    /// Scheme and host, e.g. `https://api.openai.com`.
    pub base_url: String,
    /// Chat-completions path appended to `base_url`.
    #[serde(default = "default_path")]
    pub path: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Environment variable holding the credential.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Resolved credential. Inline values in config files take precedence
    /// over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-attempt timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_path() -> String {
    "/v1/chat/completions".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("model", &self.model)
            .field("api_key_env", &self.api_key_env)
            .field("api_key", &self.api_key.as_deref().map(redact))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            path: default_path(),
            model: model.into(),
            api_key_env: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// OpenAI, `gpt-3.5-turbo`, key from `OPENAI_API_KEY`.
    pub fn openai() -> Self {
        Self::new("openai", "https://api.openai.com", "gpt-3.5-turbo")
            .with_api_key_env("OPENAI_API_KEY")
    }

    /// Perplexity, `sonar-pro`, key from `PERPLEXITY_API_KEY`.
    pub fn perplexity() -> Self {
        Self::new("perplexity", "https://api.perplexity.ai", "sonar-pro")
            .with_path("/chat/completions")
            .with_api_key_env("PERPLEXITY_API_KEY")
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = Some(var.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Per-attempt timeout, rounded up to whole seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let secs = timeout.as_secs();
        self.timeout_secs = if timeout.subsec_nanos() > 0 { secs + 1 } else { secs };
        self
    }

    /// Full chat-completions URL.
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.path.is_empty() || self.path.starts_with('/') {
            format!("{}{}", base, self.path)
        } else {
            format!("{}/{}", base, self.path)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Fill `api_key` from `api_key_env` via `lookup` unless already set.
    /// Blank values count as absent.
    fn resolve_credential(&mut self, lookup: &dyn Fn(&str) -> Option<String>) {
        if self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
            return;
        }
        self.api_key = self
            .api_key_env
            .as_deref()
            .and_then(|var| lookup(var))
            .filter(|k| !k.trim().is_empty());
    }
}

/// Ordered provider tiers plus the rate-limit policy.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// Providers in fallback order; the first is the primary.
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

impl PlannerConfig {
    /// OpenAI then Perplexity, credentials unresolved.
    pub fn default_tiers() -> Self {
        Self {
            providers: vec![ProviderConfig::openai(), ProviderConfig::perplexity()],
            backoff: BackoffConfig::standard(),
        }
    }

    /// Default tiers with credentials read from the process environment.
    pub fn from_env() -> Self {
        Self::default_tiers().resolve_credentials_with(|var| std::env::var(var).ok())
    }

    /// Parse a TOML document, resolving missing credentials from the environment.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config.resolve_credentials_with(|var| std::env::var(var).ok()))
    }

    /// Resolve each provider's credential through `lookup`.
    pub fn resolve_credentials_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for provider in &mut self.providers {
            provider.resolve_credential(&lookup);
        }
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Check structural invariants: at least one provider, every provider
    /// named and unique, base URL and model present, timeout non-zero.
    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(PlannerError::InvalidConfig(
                "at least one provider is required".into(),
            ));
        }
        let mut seen = HashSet::new();
        for provider in &self.providers {
            if provider.name.trim().is_empty() {
                return Err(PlannerError::InvalidConfig("provider name is empty".into()));
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(PlannerError::InvalidConfig(format!(
                    "duplicate provider '{}'",
                    provider.name
                )));
            }
            if provider.base_url.trim().is_empty() {
                return Err(PlannerError::InvalidConfig(format!(
                    "provider '{}' has no base_url",
                    provider.name
                )));
            }
            if provider.model.trim().is_empty() {
                return Err(PlannerError::InvalidConfig(format!(
                    "provider '{}' has no model",
                    provider.name
                )));
            }
            if provider.timeout_secs == 0 {
                return Err(PlannerError::InvalidConfig(format!(
                    "provider '{}' has a zero timeout",
                    provider.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::default_tiers()
    }
}
