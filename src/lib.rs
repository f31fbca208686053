//! # Content Planner
//!
//! Weekly content-idea generation over chat-completion providers.
//!
//! Given a topic and an audience, the crate asks a language model for seven
//! day-labeled content ideas plus a strategy summary, and tolerates whatever
//! comes back. Providers are tried in order (OpenAI, then Perplexity by
//! default); a rate-limited primary hands over at once, and a rate-limited
//! last tier gets one bounded pause before the operation settles on a
//! deterministic fallback.
//!
//! ## Core Concepts
//!
//! - **[`ContentPlanner`]**: the high-level operations. Weekly plan, idea
//!   analysis, alternate idea, provider health. None of them fail.
//! - **[`FallbackChain`]**: ordered provider tiers with the rate-limit policy
//!   in [`BackoffConfig`].
//! - **[`Backend`](backend::Backend)**: one completion provider.
//!   [`OpenAiBackend`] speaks any OpenAI-compatible endpoint;
//!   [`MockBackend`] replays scripted replies.
//! - **[`parse_weekly_plan`](output_parser::parse_weekly_plan)**: list
//!   literal first, day-prefixed lines second, placeholders last.
//! - **[`PlannerConfig`]**: provider tiers from code, TOML or the
//!   environment.
//!
//! ## Quick Start
//!
//! ```no_run
//! use content_planner::ContentPlanner;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads OPENAI_API_KEY and PERPLEXITY_API_KEY.
//!     let planner = ContentPlanner::from_env()?;
//!
//!     let plan = planner.generate_weekly_plan("home gardening", "retirees").await;
//!     for entry in plan.ideas() {
//!         println!("{}: {}", entry.day, entry.idea);
//!     }
//!     println!("{}", plan.summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Observability
//!
//! Every attempt, failure, rate-limit pause and fallback is logged through
//! `tracing`. Install any subscriber to see them. For programmatic access,
//! attach an [`EventHandler`] to the chain.

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod fallback;
pub mod output_parser;
pub mod planner;
pub mod prompt;
pub mod types;

pub use backend::{BackoffConfig, CompletionRequest, CompletionResult, MockBackend, OpenAiBackend};
pub use config::{PlannerConfig, ProviderConfig};
pub use error::{PlannerError, ProviderError, ProviderErrorKind, Result};
pub use events::{Event, EventHandler, FnEventHandler};
pub use fallback::{FallbackChain, FallbackChainBuilder};
pub use planner::ContentPlanner;
pub use types::{
    DayIdea, HealthReport, PlanSource, ProviderHealth, Weekday, WeeklyContentPlan,
};
