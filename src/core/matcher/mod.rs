//! Pattern Matcher: locates candidate user-facing literals in file content.
//!
//! Matching is a swappable strategy behind [`LiteralMatcher`]; the rest of the
//! pipeline only sees [`LiteralMatch`] values. [`RegexMatcher`] is the built-in
//! pattern-list implementation.

mod patterns;

pub use patterns::{LiteralPattern, TextRole, body_group, default_patterns};

use serde::Serialize;

use crate::{
    core::code::CodeMask,
    utils::{build_line_index, context_snippet, line_at, offset_to_line},
};

/// Characters of context kept on each side of a candidate.
const CONTEXT_RADIUS: usize = 50;

/// Line prefixes that never contain display text.
const SKIPPED_LINE_PREFIXES: &[&str] = &["//", "/*", "*", "import ", "export ", "part "];

/// A literal found by one pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralMatch {
    pub text: String,
    pub role: TextRole,
    /// Byte range of the literal body (without quotes).
    pub start: usize,
    pub end: usize,
    pub quote: char,
}

impl LiteralMatch {
    /// Byte range of the literal including its quotes.
    pub fn quoted_span(&self) -> std::ops::Range<usize> {
        self.start.saturating_sub(1)..(self.end + 1)
    }
}

/// Capability to find literals in a file.
pub trait LiteralMatcher {
    /// Every match of every pattern, in pattern priority order.
    ///
    /// The same literal span may be reported by more than one pattern.
    fn find(&self, content: &str) -> Vec<LiteralMatch>;
}

/// Literal matcher driven by an ordered list of regex patterns.
pub struct RegexMatcher {
    patterns: Vec<LiteralPattern>,
    /// Literals directly followed by this suffix are already keyed.
    keyed_suffix: Option<String>,
}

impl RegexMatcher {
    pub fn new(patterns: Vec<LiteralPattern>) -> Self {
        Self {
            patterns,
            keyed_suffix: None,
        }
    }

    /// Built-in patterns, skipping literals already followed by `suffix`.
    pub fn with_defaults(suffix: &str) -> Self {
        Self::new(default_patterns()).keyed_suffix(suffix)
    }

    pub fn keyed_suffix(mut self, suffix: &str) -> Self {
        self.keyed_suffix = Some(suffix.to_string());
        self
    }

    fn is_keyed(&self, content: &str, end: usize) -> bool {
        match &self.keyed_suffix {
            // `end` points at the closing quote.
            Some(suffix) => content[end + 1..].starts_with(suffix.as_str()),
            None => false,
        }
    }
}

impl LiteralMatcher for RegexMatcher {
    fn find(&self, content: &str) -> Vec<LiteralMatch> {
        let mask = CodeMask::new(content);
        let mut matches = Vec::new();

        for pattern in &self.patterns {
            for caps in pattern.regex.captures_iter(content) {
                let (Some(whole), Some(body)) = (caps.get(0), body_group(&caps)) else {
                    continue;
                };
                // A body at offset 0 has no opening quote.
                let Some(open_quote) = body.start().checked_sub(1) else {
                    continue;
                };

                if let Some(exclusion) = &pattern.not_preceded_by
                    && exclusion.is_match(&content[..whole.start()])
                {
                    continue;
                }

                let trimmed = line_at(content, body.start()).trim_start();
                if SKIPPED_LINE_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
                    continue;
                }

                // Spans from one string's closing quote to the next one's opening quote.
                if !mask.is_literal(&(open_quote..(body.end() + 1))) {
                    continue;
                }

                if self.is_keyed(content, body.end()) {
                    continue;
                }

                let quote = content[..body.start()].chars().next_back().unwrap_or('\'');
                matches.push(LiteralMatch {
                    text: unescape_quotes(body.as_str()),
                    role: pattern.role,
                    start: body.start(),
                    end: body.end(),
                    quote,
                });
            }
        }

        matches
    }
}

/// Drop the backslash from escaped quotes; other escapes stay as written.
fn unescape_quotes(body: &str) -> String {
    let mut text = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some(q @ ('\'' | '"')) => text.push(q),
            Some(other) => {
                text.push(c);
                text.push(other);
            }
            None => text.push(c),
        }
    }
    text
}

/// A located literal occurrence, kept for classification and audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub text: String,
    /// 1-based line of the literal.
    pub line: usize,
    pub role: TextRole,
    pub context: String,
}

/// Run `matcher` over `content` and attach line numbers and context, in file order.
pub fn find_candidates(matcher: &dyn LiteralMatcher, content: &str) -> Vec<Candidate> {
    let line_index = build_line_index(content);
    let mut matches = matcher.find(content);
    // Stable: same-span matches keep pattern priority order.
    matches.sort_by_key(|m| m.start);
    matches
        .into_iter()
        .map(|m| Candidate {
            line: offset_to_line(&line_index, m.start),
            context: context_snippet(content, m.start, m.end, CONTEXT_RADIUS),
            text: m.text,
            role: m.role,
        })
        .collect()
}
