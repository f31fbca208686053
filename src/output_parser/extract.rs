//! Shared text cleanup for model output.
//!
//! Every parser calls [`preprocess`] first; the smaller helpers tidy the
//! fragments that the list and line strategies cut out of the response.

/// Strip reasoning blocks and surrounding whitespace.
pub fn preprocess(text: &str) -> String {
    strip_think_tags(text).trim().to_string()
}

/// Strip all `<think>...</think>` and `<thinking>...</thinking>` blocks.
///
/// An unclosed block swallows the rest of the text.
///
/// # Examples
///
/// ```
/// use content_planner::output_parser::strip_think_tags;
///
/// assert_eq!(strip_think_tags("<think>plan the week</think>['Monday: x']"), "['Monday: x']");
/// assert_eq!(strip_think_tags("<thinking>never closed"), "");
/// ```
pub fn strip_think_tags(text: &str) -> String {
    let once = strip_block(text, "<think>", "</think>");
    strip_block(&once, "<thinking>", "</thinking>")
}

fn strip_block(text: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        match rest[start..].find(close) {
            Some(offset) => rest = &rest[start + offset + close.len()..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Text after the first `:`, trimmed, with wrapping quotes removed.
///
/// Returns `None` when there is no separator.
pub fn text_after_separator(entry: &str) -> Option<String> {
    let (_, after) = entry.split_once(':')?;
    Some(strip_wrapping_quotes(after))
}

/// Trim whitespace, then `"`, then `'`, then whitespace again.
pub fn strip_wrapping_quotes(text: &str) -> String {
    text.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string()
}

/// Clean the prose following a list literal into a summary.
///
/// Leading separators (`. , ; : -`, code-fence backticks) and whitespace are
/// dropped. Returns an empty string when nothing is left.
pub fn trailing_summary(tail: &str) -> String {
    tail.trim_start_matches(|c: char| c.is_whitespace() || ".,;:-`".contains(c))
        .trim()
        .to_string()
}

/// Drop a leading bullet, number or markdown emphasis from a line.
///
/// `"1. Monday: x"`, `"- Monday: x"` and `"**Monday**: x"` all become
/// `"Monday..."`.
pub fn strip_list_marker(line: &str) -> &str {
    let mut s = line.trim_start();
    for prefix in ["-", "*", "\u{2022}", "#"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.trim_start_matches(prefix).trim_start();
            break;
        }
    }
    let digits = s.trim_start_matches(|c: char| c.is_ascii_digit());
    if digits.len() < s.len() {
        if let Some(rest) = digits.strip_prefix('.').or_else(|| digits.strip_prefix(')')) {
            s = rest.trim_start();
        }
    }
    s.trim_start_matches('*').trim_start()
}
