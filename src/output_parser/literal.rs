//! Tolerant scanner for bracketed list literals in model output.
//!
//! Models asked for "a Python list" return JSON arrays, Python lists with
//! single quotes, lists wrapped in prose, and lists whose strings contain
//! brackets of their own (`'Monday: [specific idea]'`). The scanner reads the
//! literal directly instead of handing candidate substrings to a decoder.
//!
//! Accepted grammar:
//!
//! ```text
//! list   := '[' ws (value ws (',' ws value ws)* (',' ws)?)? ']'
//! tuple  := '(' ... ')'            (same element syntax as list)
//! dict   := '{' ws (entry ws (',' ws entry ws)* (',' ws)?)? '}'
//! entry  := value (ws ':' ws value)?   (a set when no ':' is present)
//! value  := string (ws string)* | list | tuple | dict | scalar
//! string := '...' | "..."          (backslash escapes, no raw newlines)
//! scalar := number | True | False | None | true | false | null
//! ```
//!
//! Adjacent strings concatenate, as they do in Python source.

use tracing::trace;

/// Nested lists deeper than this are rejected.
const MAX_DEPTH: usize = 32;

/// One element of a decoded list.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralItem {
    Str(String),
    /// A number, boolean, null, nested list, tuple or dict.
    Other,
}

/// A list literal located in a larger text.
#[derive(Debug, Clone, PartialEq)]
pub struct ListLiteral {
    /// Byte offset of the opening `[`.
    pub start: usize,
    /// Byte offset just past the closing `]`.
    pub end: usize,
    pub items: Vec<LiteralItem>,
}

impl ListLiteral {
    /// The string elements, in order.
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            LiteralItem::Str(s) => Some(s.as_str()),
            LiteralItem::Other => None,
        })
    }
}

/// Find the first list literal with at least `min_strings` string elements.
///
/// Candidates are tried by position of their opening `[`. For each start the
/// scanner stops at the first `]` that closes a well-formed literal, which is
/// the earliest end any decoder could accept. Scanning is linear per start,
/// so the worst case (many `[` that each almost parse) is quadratic in the
/// text length.
pub fn find_list_literal(text: &str, min_strings: usize) -> Option<ListLiteral> {
    for (start, _) in text.match_indices('[') {
        let Some((end, items)) = scan_list_at(text, start) else {
            trace!(start, "no well-formed list literal at this bracket");
            continue;
        };
        let literal = ListLiteral { start, end, items };
        let count = literal.strings().count();
        if count >= min_strings {
            return Some(literal);
        }
        trace!(start, count, min_strings, "list literal has too few strings");
    }
    None
}

/// Decode the list literal opening at byte `start`.
///
/// Returns the offset just past its closing `]` and the decoded items.
pub fn scan_list_at(text: &str, start: usize) -> Option<(usize, Vec<LiteralItem>)> {
    let mut cursor = Cursor { text, pos: start };
    let items = cursor.list(0)?;
    Some((cursor.pos, items))
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn list(&mut self, depth: usize) -> Option<Vec<LiteralItem>> {
        self.sequence('[', ']', depth, false)
    }

    /// Comma-separated values between `open` and `close`, trailing comma
    /// allowed. With `keyed`, each value may carry a `: value` part.
    fn sequence(
        &mut self,
        open: char,
        close: char,
        depth: usize,
        keyed: bool,
    ) -> Option<Vec<LiteralItem>> {
        if depth > MAX_DEPTH || !self.eat(open) {
            return None;
        }
        let mut items = Vec::new();
        self.skip_ws();
        if self.eat(close) {
            return Some(items);
        }
        loop {
            items.push(self.value(depth)?);
            self.skip_ws();
            if keyed && self.eat(':') {
                self.skip_ws();
                self.value(depth)?;
                self.skip_ws();
            }
            if self.eat(close) {
                return Some(items);
            }
            if !self.eat(',') {
                return None;
            }
            self.skip_ws();
            // Trailing comma.
            if self.eat(close) {
                return Some(items);
            }
        }
    }

    fn value(&mut self, depth: usize) -> Option<LiteralItem> {
        match self.peek()? {
            '[' => self.list(depth + 1).map(|_| LiteralItem::Other),
            '(' => self
                .sequence('(', ')', depth + 1, false)
                .map(|_| LiteralItem::Other),
            '{' => self
                .sequence('{', '}', depth + 1, true)
                .map(|_| LiteralItem::Other),
            '\'' | '"' => {
                let mut joined = self.string()?;
                loop {
                    let save = self.pos;
                    self.skip_ws();
                    match self.peek() {
                        Some('\'' | '"') => joined.push_str(&self.string()?),
                        _ => {
                            self.pos = save;
                            break;
                        }
                    }
                }
                Some(LiteralItem::Str(joined))
            }
            _ => self.scalar(),
        }
    }

    fn string(&mut self) -> Option<String> {
        let quote = self.bump()?;
        let mut out = String::new();
        loop {
            match self.bump()? {
                c if c == quote => return Some(out),
                '\n' => return None,
                '\\' => match self.bump()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    c @ ('\\' | '\'' | '"') => out.push(c),
                    // Escaped line continuation.
                    '\n' => {}
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                },
                c => out.push(c),
            }
        }
    }

    fn scalar(&mut self) -> Option<LiteralItem> {
        let rest = &self.text[self.pos..];
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || "+-._".contains(c)))
            .unwrap_or(rest.len());
        let token = &rest[..len];
        let known = matches!(token, "True" | "False" | "None" | "true" | "false" | "null");
        if token.is_empty() || !(known || token.parse::<f64>().is_ok()) {
            return None;
        }
        self.pos += len;
        Some(LiteralItem::Other)
    }
}
