//! Weekly plan extraction.

use crate::output_parser::extract::{preprocess, text_after_separator, trailing_summary};
use crate::output_parser::lines::ideas_from_lines;
use crate::output_parser::literal::{find_list_literal, ListLiteral};
use crate::types::{default_summary, PlanSource, Weekday, WeeklyContentPlan};
use tracing::{debug, warn};

/// A list literal needs this many string elements to count as the plan.
pub const MIN_LIST_STRINGS: usize = 5;

/// Parse model output into a seven-day plan. Never fails.
///
/// Strategies, in order:
/// 1. The first bracketed list literal with at least [`MIN_LIST_STRINGS`]
///    strings. Each day takes the first element starting with its name;
///    the text after that element's first `:` is the idea. Prose after the
///    list becomes the summary.
/// 2. Day-prefixed lines, when no list literal qualifies.
///
/// Days without a match get a placeholder naming the topic and the day.
/// So does a matched entry with nothing after its `:`, such as `'Monday:'`.
///
/// # Examples
///
/// ```
/// use content_planner::output_parser::parse_weekly_plan;
/// use content_planner::types::{PlanSource, Weekday};
///
/// let raw = "['Monday: Intro', 'Tuesday: Myths', 'Wednesday: Tutorial', \
///            'Thursday: Case study', 'Friday: Tools', 'Saturday: Trends', \
///            'Sunday: Q&A'] A steady ramp.";
/// let plan = parse_weekly_plan(raw, "SEO", "marketers");
/// assert_eq!(plan.source(), PlanSource::ListLiteral);
/// assert_eq!(plan.idea_for(Weekday::Sunday), "Q&A");
/// assert_eq!(plan.summary(), "A steady ramp.");
/// ```
pub fn parse_weekly_plan(raw: &str, topic: &str, audience: &str) -> WeeklyContentPlan {
    let text = preprocess(raw);

    if !(text.contains('[') && text.contains(']')) {
        debug!(strategy = "lines", "response has no brackets");
        return WeeklyContentPlan::from_parts(
            ideas_from_lines(&text, topic),
            default_summary(topic, audience),
            PlanSource::Lines,
            topic,
            audience,
        );
    }

    match find_list_literal(&text, MIN_LIST_STRINGS) {
        Some(list) => {
            debug!(
                strategy = "list_literal",
                start = list.start,
                elements = list.items.len(),
                "found list literal"
            );
            WeeklyContentPlan::from_parts(
                ideas_from_list(&list, topic),
                trailing_summary(&text[list.end..]),
                PlanSource::ListLiteral,
                topic,
                audience,
            )
        }
        None => {
            warn!(strategy = "lines", "no usable list literal, scanning lines");
            WeeklyContentPlan::from_parts(
                ideas_from_lines(&text, topic),
                format!("Strategic weekly content plan for {} targeting {}.", topic, audience),
                PlanSource::Lines,
                topic,
                audience,
            )
        }
    }
}

fn ideas_from_list(list: &ListLiteral, topic: &str) -> Vec<String> {
    Weekday::ALL
        .iter()
        .map(|&day| {
            list.strings()
                .find(|s| day.prefixes(s.trim()))
                .and_then(text_after_separator)
                .filter(|idea| !idea.is_empty())
                .unwrap_or_else(|| format!("Creative {} content for {}", topic, day.lower()))
        })
        .collect()
}
