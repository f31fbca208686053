//! High-level content planning operations.
//!
//! [`ContentPlanner`] renders a prompt, runs it through the
//! [`FallbackChain`], and turns the reply into a result. None of its
//! operations fail: when every provider is down the caller gets a
//! deterministic value built from the topic, audience and day.

use crate::backend::CompletionRequest;
use crate::config::PlannerConfig;
use crate::error::Result;
use crate::fallback::FallbackChain;
use crate::output_parser::parse_weekly_plan;
use crate::prompt;
use crate::types::{HealthReport, PlanSource, ProviderHealth, WeeklyContentPlan};
use tracing::{debug, info, warn};

const PLAN_MAX_TOKENS: u32 = 900;
const PLAN_TEMPERATURE: f64 = 0.8;
const ANALYSIS_MAX_TOKENS: u32 = 150;
const ANALYSIS_TEMPERATURE: f64 = 0.7;
const ALTERNATE_MAX_TOKENS: u32 = 100;
const ALTERNATE_TEMPERATURE: f64 = 1.0;
const HEALTH_MAX_TOKENS: u32 = 10;
const HEALTH_TEMPERATURE: f64 = 0.1;

/// Generates weekly plans, idea analyses and replacement ideas.
///
/// # Example
///
/// ```
/// use content_planner::backend::MockBackend;
/// use content_planner::fallback::FallbackChain;
/// use content_planner::planner::ContentPlanner;
/// use content_planner::types::Weekday;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let reply = "['Monday: a', 'Tuesday: b', 'Wednesday: c', 'Thursday: d', \
///              'Friday: e', 'Saturday: f', 'Sunday: g'] Short summary.";
/// let chain = FallbackChain::builder()
///     .provider(Arc::new(MockBackend::fixed("openai", reply)))
///     .build()
///     .unwrap();
///
/// let plan = ContentPlanner::new(chain).generate_weekly_plan("SEO", "founders").await;
/// assert_eq!(plan.idea_for(Weekday::Friday), "e");
/// assert_eq!(plan.summary(), "Short summary.");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct ContentPlanner {
    chain: FallbackChain,
}

impl ContentPlanner {
    pub fn new(chain: FallbackChain) -> Self {
        Self { chain }
    }

    /// One HTTP tier per configured provider.
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        Ok(Self::new(FallbackChain::from_config(config)?))
    }

    /// The default OpenAI then Perplexity tiers, keys read from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&PlannerConfig::from_env())
    }

    pub fn chain(&self) -> &FallbackChain {
        &self.chain
    }

    /// Seven ideas, Monday to Sunday, plus a strategy summary.
    pub async fn generate_weekly_plan(&self, topic: &str, audience: &str) -> WeeklyContentPlan {
        info!(topic, audience, "generating weekly plan");
        let prompt = prompt::weekly_plan_prompt(topic, audience);

        match self
            .chain
            .call_with_fallback(&prompt, PLAN_MAX_TOKENS, PLAN_TEMPERATURE)
            .await
        {
            Ok(result) => {
                let plan = parse_weekly_plan(&result.text, topic, audience);
                info!(
                    provider = %result.provider,
                    source = ?plan.source(),
                    "weekly plan generated"
                );
                plan
            }
            Err(err) => {
                warn!(error = %err, "weekly plan generation failed, using fallback plan");
                fallback_plan(topic, audience)
            }
        }
    }

    /// A 2-3 sentence rationale for scheduling `idea` on `day`.
    pub async fn analyze_idea(&self, topic: &str, audience: &str, idea: &str, day: &str) -> String {
        let prompt = prompt::analysis_prompt(topic, audience, idea, day);
        match self
            .chain
            .call_with_fallback(&prompt, ANALYSIS_MAX_TOKENS, ANALYSIS_TEMPERATURE)
            .await
        {
            Ok(result) => {
                debug!(provider = %result.provider, day, "idea analyzed");
                result.text
            }
            Err(err) => {
                warn!(error = %err, day, "idea analysis failed, using fallback text");
                format!(
                    "This {} content idea about {} is designed to engage {} with relevant, \
                     timely information. The content provides valuable insights tailored to \
                     their specific needs and interests.",
                    day, topic, audience
                )
            }
        }
    }

    /// One replacement idea for `day`, avoiding `exclude` when it is non-empty.
    pub async fn generate_alternate_idea(
        &self,
        topic: &str,
        audience: &str,
        day: &str,
        exclude: &str,
    ) -> String {
        let prompt = prompt::alternate_idea_prompt(topic, audience, day, exclude);
        let fallback = || format!("Alternative {} content about {} for {}", day, topic, audience);

        match self
            .chain
            .call_with_fallback(&prompt, ALTERNATE_MAX_TOKENS, ALTERNATE_TEMPERATURE)
            .await
        {
            Ok(result) => {
                let idea = clean_idea(&result.text);
                if idea.is_empty() {
                    warn!(provider = %result.provider, day, "alternate idea was empty");
                    fallback()
                } else {
                    debug!(provider = %result.provider, day, "alternate idea generated");
                    idea
                }
            }
            Err(err) => {
                warn!(error = %err, day, "alternate idea failed, using fallback text");
                fallback()
            }
        }
    }

    /// Probe every provider with a trivial completion.
    ///
    /// Providers are called directly, not through the fallback chain, so
    /// each one reports its own status.
    pub async fn check_provider_health(&self) -> HealthReport {
        let mut providers = Vec::with_capacity(self.chain.providers().len());

        for backend in self.chain.providers() {
            let name = backend.name().to_string();
            let credential_present = backend.has_credential();
            let outcome = match CompletionRequest::new(
                prompt::health_check_prompt(&name),
                HEALTH_MAX_TOKENS,
                HEALTH_TEMPERATURE,
            ) {
                Ok(request) => backend
                    .complete(&request.targeting(&name))
                    .await
                    .map_err(|err| err.to_string()),
                Err(err) => Err(err.to_string()),
            };

            let (available, error) = match outcome {
                Ok(result) if result.text.to_lowercase().contains("successful") => (true, None),
                Ok(_) => (false, Some("Unexpected response format".to_string())),
                Err(message) => (false, Some(message)),
            };
            debug!(provider = %name, available, "provider health checked");

            providers.push(ProviderHealth {
                provider: name,
                credential_present,
                available,
                error,
            });
        }

        HealthReport {
            fallback_enabled: providers.len() > 1,
            providers,
        }
    }
}

/// Trim whitespace, then double quotes, then single quotes, then whitespace.
fn clean_idea(text: &str) -> String {
    text.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string()
}

/// Plan returned when no provider produced a reply.
pub fn fallback_plan(topic: &str, audience: &str) -> WeeklyContentPlan {
    let ideas = vec![
        format!("Introduction to {} basics for {}", topic, audience),
        format!("Common {} challenges and solutions", topic),
        format!("Advanced {} strategies and techniques", topic),
        format!("Real-world {} case studies", topic),
        format!("Essential {} tools and resources", topic),
        format!("Latest {} trends and insights", topic),
        format!("{} community tips and networking", topic),
    ];
    let summary = format!(
        "Comprehensive weekly content plan for {} designed to educate and engage {}. \
         This fallback plan covers fundamental to advanced concepts with practical applications.",
        topic, audience
    );
    WeeklyContentPlan::from_parts(ideas, summary, PlanSource::Fallback, topic, audience)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackoffConfig, MockBackend, MockReply};
    use crate::error::ProviderErrorKind;
    use crate::types::Weekday;
    use std::sync::Arc;
    use std::time::Duration;

    fn planner(tiers: &[&Arc<MockBackend>]) -> ContentPlanner {
        let mut builder = FallbackChain::builder().backoff(BackoffConfig::none());
        for tier in tiers {
            builder = builder.provider((*tier).clone());
        }
        ContentPlanner::new(builder.build().unwrap())
    }

    fn down(name: &str) -> Arc<MockBackend> {
        Arc::new(MockBackend::failing(name, ProviderErrorKind::ServerError))
    }

    #[tokio::test]
    async fn test_weekly_plan_parses_primary_reply() {
        let primary = Arc::new(MockBackend::fixed(
            "openai",
            "['Monday: Intro post', 'Tuesday: Myth-busting', 'Wednesday: Tutorial', \
             'Thursday: Case study', 'Friday: Tool roundup', 'Saturday: Trend recap', \
             'Sunday: Q&A'] This plan builds momentum.",
        ));
        let secondary = Arc::new(MockBackend::fixed("perplexity", "unused"));

        let plan = planner(&[&primary, &secondary])
            .generate_weekly_plan("AI", "marketers")
            .await;

        assert_eq!(plan.source(), PlanSource::ListLiteral);
        assert_eq!(plan.idea_for(Weekday::Thursday), "Case study");
        assert_eq!(plan.summary(), "This plan builds momentum.");
        assert_eq!(secondary.calls(), 0);

        let prompts = primary.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("'AI'"));
    }

    #[tokio::test]
    async fn test_weekly_plan_from_secondary_after_rate_limit() {
        let primary = Arc::new(MockBackend::new(
            "openai",
            vec![MockReply::rate_limited(Duration::from_secs(60))],
        ));
        let secondary = Arc::new(MockBackend::fixed(
            "perplexity",
            "Monday: Kickoff\nTuesday: Deep dive",
        ));

        let plan = planner(&[&primary, &secondary])
            .generate_weekly_plan("chess", "kids")
            .await;

        assert_eq!(plan.source(), PlanSource::Lines);
        assert_eq!(plan.idea_for(Weekday::Monday), "Kickoff");
        assert_eq!(plan.idea_for(Weekday::Sunday), "Content idea for sunday about chess");
    }

    #[tokio::test]
    async fn test_total_failure_returns_fallback_values() {
        let p = planner(&[&down("openai"), &down("perplexity")]);

        let plan = p.generate_weekly_plan("yoga", "beginners").await;
        assert_eq!(plan.source(), PlanSource::Fallback);
        assert_eq!(plan.idea_for(Weekday::Monday), "Introduction to yoga basics for beginners");
        assert_eq!(plan.idea_for(Weekday::Sunday), "yoga community tips and networking");
        assert_eq!(
            plan.summary(),
            "Comprehensive weekly content plan for yoga designed to educate and engage beginners. \
             This fallback plan covers fundamental to advanced concepts with practical applications."
        );

        let analysis = p.analyze_idea("yoga", "beginners", "Breathing basics", "Monday").await;
        assert_eq!(
            analysis,
            "This Monday content idea about yoga is designed to engage beginners with relevant, \
             timely information. The content provides valuable insights tailored to their \
             specific needs and interests."
        );

        let alternate = p
            .generate_alternate_idea("yoga", "beginners", "Friday", "Breathing basics")
            .await;
        assert_eq!(alternate, "Alternative Friday content about yoga for beginners");
    }

    #[tokio::test]
    async fn test_analysis_returns_reply_text() {
        let primary = Arc::new(MockBackend::fixed("openai", "It works because..."));
        let p = planner(&[&primary]);
        let text = p.analyze_idea("SEO", "founders", "Keyword myths", "Tuesday").await;
        assert_eq!(text, "It works because...");
        assert!(primary.prompts()[0].contains("Content Idea: Keyword myths"));
    }

    #[tokio::test]
    async fn test_alternate_idea_strips_quotes() {
        let primary = Arc::new(MockBackend::fixed("openai", "  \"'Podcast with a skeptic'\"  "));
        let p = planner(&[&primary]);
        let idea = p.generate_alternate_idea("SEO", "founders", "Friday", "").await;
        assert_eq!(idea, "Podcast with a skeptic");
        assert!(!primary.prompts()[0].contains("DO NOT"));
    }

    #[tokio::test]
    async fn test_alternate_idea_passes_exclusion() {
        let primary = Arc::new(MockBackend::fixed("openai", "Fresh take"));
        let p = planner(&[&primary]);
        p.generate_alternate_idea("SEO", "founders", "Friday", "Keyword myths")
            .await;
        assert!(primary.prompts()[0].contains("DO NOT suggest anything similar to: 'Keyword myths'"));
    }

    #[tokio::test]
    async fn test_alternate_idea_empty_reply_falls_back() {
        let primary = Arc::new(MockBackend::fixed("openai", " \"\" "));
        let p = planner(&[&primary]);
        let idea = p.generate_alternate_idea("SEO", "founders", "Friday", "").await;
        assert_eq!(idea, "Alternative Friday content about SEO for founders");
    }

    #[tokio::test]
    async fn test_health_reports_each_provider() {
        let openai = Arc::new(MockBackend::fixed("openai", "OpenAI test successful."));
        let perplexity = Arc::new(MockBackend::fixed("perplexity", "Hello there"));
        let report = planner(&[&openai, &perplexity]).check_provider_health().await;

        assert!(report.fallback_enabled);
        assert!(report.any_available());

        let first = report.get("openai").unwrap();
        assert!(first.available);
        assert!(first.credential_present);
        assert_eq!(first.error, None);

        let second = report.get("perplexity").unwrap();
        assert!(!second.available);
        assert_eq!(second.error.as_deref(), Some("Unexpected response format"));

        assert_eq!(openai.prompts(), vec!["Say 'OpenAI test successful'".to_string()]);
        assert_eq!(perplexity.prompts(), vec!["Say 'Perplexity test successful'".to_string()]);
    }

    #[tokio::test]
    async fn test_health_reports_provider_errors_without_fallback() {
        let openai = down("openai");
        let report = planner(&[&openai]).check_provider_health().await;

        assert!(!report.fallback_enabled);
        assert!(!report.any_available());
        let status = report.get("openai").unwrap();
        assert!(status.error.as_deref().unwrap().contains("server_error"));
        assert_eq!(openai.calls(), 1);
    }

    #[test]
    fn test_fallback_plan_has_seven_ideas() {
        let plan = fallback_plan("t", "a");
        assert_eq!(plan.ideas().len(), 7);
        assert_eq!(plan.idea_for(Weekday::Tuesday), "Common t challenges and solutions");
    }
}
