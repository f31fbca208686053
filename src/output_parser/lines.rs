//! Line-oriented fallback for responses without a usable list literal.

use crate::output_parser::extract::{strip_list_marker, text_after_separator};
use crate::types::Weekday;

/// One idea per weekday, taken from the first line that starts with the
/// day's name.
///
/// Lines may carry bullets, numbering or bold markers. A day whose first
/// matching line has no `:` separator or nothing after it, or that has no
/// line at all, gets `"Content idea for {day} about {topic}"`.
pub fn ideas_from_lines(text: &str, topic: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(strip_list_marker)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    Weekday::ALL
        .iter()
        .map(|&day| {
            lines
                .iter()
                .find(|line| day.prefixes(line))
                .and_then(|line| text_after_separator(line))
                .map(|idea| idea.trim_matches('*').trim().to_string())
                .filter(|idea| !idea.is_empty())
                .unwrap_or_else(|| format!("Content idea for {} about {}", day.lower(), topic))
        })
        .collect()
}
