use serde::{Deserialize, Serialize};
use std::fmt;

/// Days of the content week, in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Monday through Sunday.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Lowercase name, as used in placeholder text.
    pub fn lower(self) -> String {
        self.name().to_lowercase()
    }

    /// Whether `text` starts with this day's name, ignoring case.
    pub fn prefixes(self, text: &str) -> bool {
        let name = self.name();
        text.get(..name.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One day's slot in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayIdea {
    pub day: Weekday,
    pub idea: String,
}

/// Which strategy produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    /// A bracketed list literal in the model output.
    ListLiteral,
    /// Day-prefixed lines in the model output.
    Lines,
    /// No provider answered; the fixed fallback plan.
    Fallback,
}

/// Seven day-labeled ideas plus a strategy summary.
///
/// Always holds exactly seven entries, Monday to Sunday. Construct through
/// [`from_parts`](Self::from_parts), which pads or truncates as needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyContentPlan {
    ideas: Vec<DayIdea>,
    summary: String,
    source: PlanSource,
}

impl WeeklyContentPlan {
    /// Normalize raw ideas into a plan.
    ///
    /// Ideas are assigned to days in order. Beyond seven they are dropped;
    /// missing days get `"{day} content idea about {topic}"`. An empty summary
    /// becomes the default strategy sentence. Applying this to an already
    /// normalized plan's parts returns an equal plan.
    pub fn from_parts(
        ideas: Vec<String>,
        summary: impl Into<String>,
        source: PlanSource,
        topic: &str,
        audience: &str,
    ) -> Self {
        let mut ideas = ideas.into_iter();
        let ideas = Weekday::ALL
            .iter()
            .map(|&day| DayIdea {
                day,
                idea: ideas
                    .next()
                    .unwrap_or_else(|| format!("{} content idea about {}", day.lower(), topic)),
            })
            .collect();

        let summary = summary.into();
        let summary = if summary.trim().is_empty() {
            default_summary(topic, audience)
        } else {
            summary
        };

        Self {
            ideas,
            summary,
            source,
        }
    }

    /// The seven entries, Monday first.
    pub fn ideas(&self) -> &[DayIdea] {
        &self.ideas
    }

    /// Idea texts only, Monday first.
    pub fn idea_texts(&self) -> Vec<String> {
        self.ideas.iter().map(|d| d.idea.clone()).collect()
    }

    /// The idea scheduled for `day`.
    pub fn idea_for(&self, day: Weekday) -> &str {
        self.ideas
            .iter()
            .find(|d| d.day == day)
            .map(|d| d.idea.as_str())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn source(&self) -> PlanSource {
        self.source
    }
}

/// The summary used when none could be taken from model output.
pub(crate) fn default_summary(topic: &str, audience: &str) -> String {
    format!(
        "Comprehensive weekly content strategy for {}, designed to engage {} across all seven days.",
        topic, audience
    )
}

/// Live status of one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderHealth {
    pub provider: String,
    /// Whether a credential is configured.
    pub credential_present: bool,
    /// Whether a trivial live completion succeeded.
    pub available: bool,
    pub error: Option<String>,
}

/// Per-provider status, in fallback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub providers: Vec<ProviderHealth>,
    /// More than one tier is configured.
    pub fallback_enabled: bool,
}

impl HealthReport {
    pub fn get(&self, provider: &str) -> Option<&ProviderHealth> {
        self.providers.iter().find(|p| p.provider == provider)
    }

    /// At least one provider answered.
    pub fn any_available(&self) -> bool {
        self.providers.iter().any(|p| p.available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_prefixes_ignores_case() {
        assert!(Weekday::Monday.prefixes("MONDAY: launch"));
        assert!(Weekday::Sunday.prefixes("sunday recap"));
        assert!(!Weekday::Monday.prefixes("Mon: short"));
        assert!(!Weekday::Friday.prefixes(""));
    }

    #[test]
    fn test_from_parts_pads_missing_days() {
        let plan = WeeklyContentPlan::from_parts(
            vec!["a".into(), "b".into()],
            "",
            PlanSource::Lines,
            "rust",
            "developers",
        );
        assert_eq!(plan.ideas().len(), 7);
        assert_eq!(plan.idea_for(Weekday::Tuesday), "b");
        assert_eq!(plan.idea_for(Weekday::Wednesday), "wednesday content idea about rust");
        assert_eq!(
            plan.summary(),
            "Comprehensive weekly content strategy for rust, designed to engage developers across all seven days."
        );
    }

    #[test]
    fn test_from_parts_truncates_extra_ideas() {
        let ideas: Vec<String> = (1..=9).map(|i| format!("idea {i}")).collect();
        let plan = WeeklyContentPlan::from_parts(ideas, "s", PlanSource::ListLiteral, "t", "a");
        assert_eq!(plan.ideas().len(), 7);
        assert_eq!(plan.idea_for(Weekday::Sunday), "idea 7");
        let days: Vec<_> = plan.ideas().iter().map(|d| d.day).collect();
        assert_eq!(days, Weekday::ALL.to_vec());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let plan = WeeklyContentPlan::from_parts(
            vec!["only monday".into()],
            "",
            PlanSource::Lines,
            "gardening",
            "retirees",
        );
        let again = WeeklyContentPlan::from_parts(
            plan.idea_texts(),
            plan.summary(),
            plan.source(),
            "gardening",
            "retirees",
        );
        assert_eq!(plan, again);
    }

    #[test]
    fn test_plan_serializes_for_api_layer() {
        let plan = WeeklyContentPlan::from_parts(vec![], "s", PlanSource::Fallback, "t", "a");
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["ideas"][0]["day"], "Monday");
        assert_eq!(value["source"], "fallback");
        assert_eq!(value["summary"], "s");
    }
}
