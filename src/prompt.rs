//! Prompt templates and builders.
//!
//! Templates are plain strings with `{name}` placeholders, filled by
//! [`render`]. The builders are pure: same inputs, same prompt.

/// Weekly plan. The example list biases the model toward the bracketed
/// `'Day: idea'` format the parser reads best.
pub const WEEKLY_PLAN_TEMPLATE: &str = "\
You are an expert content strategist creating content for {audience}.
Create 7 unique, engaging content ideas about '{topic}' for a weekly content calendar.

Requirements for each idea:
- Tailored specifically for {audience}
- Relevant, actionable, and valuable
- Different approach/angle for each day
- Concise but descriptive (10-15 words max)

IMPORTANT: Format your response EXACTLY as a Python list:
{day_slots}

After the list, provide a 2-3 sentence summary of the week's content strategy.

Example format:
['Monday: Introduction to {topic} fundamentals for beginners', \
'Tuesday: Common {topic} mistakes to avoid', \
'Wednesday: Advanced {topic} techniques', \
'Thursday: {topic} case studies and examples', \
'Friday: Tools and resources for {topic}', \
'Saturday: {topic} trends and future outlook', \
'Sunday: {topic} community and networking tips']

This comprehensive weekly plan educates {audience} about {topic}, progressing from \
basics to advanced applications while building community engagement.";

pub const ANALYSIS_TEMPLATE: &str = "\
As a content strategist, analyze why this content idea is effective for {day}:

Topic: {topic}
Audience: {audience}
Content Idea: {idea}

Write 2-3 sentences explaining:
1. Why this idea works well for {day}
2. How it appeals to {audience}
3. What specific value it provides

Keep it concise, actionable, and professional.";

pub const ALTERNATE_IDEA_TEMPLATE: &str = "\
Generate a fresh, creative content idea for {day} about '{topic}' targeting {audience}.
Make it engaging, specific, and different from typical content in this space.
Focus on actionable value for {audience}.
Provide ONLY the content idea title/description, no extra text.{exclude_clause}";

pub const HEALTH_CHECK_TEMPLATE: &str = "Say '{label} test successful'";

/// Fill `{key}` placeholders from `vars`.
///
/// Use `{{` to insert a literal `{` and `}}` to insert a literal `}`.
/// Unknown placeholders are left as written. Substituted values are not
/// scanned again, so a topic containing `{day}` stays as typed.
///
/// # Example
///
/// ```
/// use content_planner::prompt::render;
///
/// let result = render(
///     "Ideas about {topic}, as JSON: {{\"day\": \"{day}\"}}",
///     &[("topic", "Rust"), ("day", "Monday")],
/// );
/// assert_eq!(result, r#"Ideas about Rust, as JSON: {"day": "Monday"}"#);
/// ```
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
        } else if let Some(after) = tail.strip_prefix('{') {
            let value = after.find('}').and_then(|end| {
                let key = &after[..end];
                vars.iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, value)| (*value, &after[end + 1..]))
            });
            match value {
                Some((value, after_placeholder)) => {
                    out.push_str(value);
                    rest = after_placeholder;
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        } else {
            // Lone '}'.
            out.push('}');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Prompt for a seven-day plan plus summary.
pub fn weekly_plan_prompt(topic: &str, audience: &str) -> String {
    let day_slots = format!(
        "[{}]",
        crate::types::Weekday::ALL
            .iter()
            .map(|day| format!("'{}: [specific idea]'", day))
            .collect::<Vec<_>>()
            .join(", ")
    );
    render(
        WEEKLY_PLAN_TEMPLATE,
        &[
            ("topic", topic),
            ("audience", audience),
            ("day_slots", &day_slots),
        ],
    )
}

/// Prompt for a short rationale of one scheduled idea.
pub fn analysis_prompt(topic: &str, audience: &str, idea: &str, day: &str) -> String {
    render(
        ANALYSIS_TEMPLATE,
        &[
            ("topic", topic),
            ("audience", audience),
            ("idea", idea),
            ("day", day),
        ],
    )
}

/// Prompt for one replacement idea. A non-empty `exclude` adds an
/// instruction not to repeat it.
pub fn alternate_idea_prompt(topic: &str, audience: &str, day: &str, exclude: &str) -> String {
    let exclude_clause = if exclude.is_empty() {
        String::new()
    } else {
        format!("\n\nDO NOT suggest anything similar to: '{}'", exclude)
    };
    render(
        ALTERNATE_IDEA_TEMPLATE,
        &[
            ("topic", topic),
            ("audience", audience),
            ("day", day),
            ("exclude_clause", &exclude_clause),
        ],
    )
}

/// Liveness probe for the provider named `provider`.
pub fn health_check_prompt(provider: &str) -> String {
    render(HEALTH_CHECK_TEMPLATE, &[("label", &provider_label(provider))])
}

/// Human-facing provider name: `openai` → `OpenAI`, `perplexity` → `Perplexity`.
fn provider_label(provider: &str) -> String {
    if provider.eq_ignore_ascii_case("openai") {
        return "OpenAI".to_string();
    }
    let mut chars = provider.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
