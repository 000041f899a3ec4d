//! Source Rewriter: replaces stored literals with key lookups.
//!
//! Every replacement, modifier removal and the import insertion for one file are
//! planned first and applied in a single end-to-start pass. A rewritten literal
//! is followed by the lookup suffix, so the matcher never reports it again and
//! a second run plans nothing.

use std::{collections::HashMap, ops::Range};

use serde::Serialize;

use crate::{
    config::LookupConfig,
    core::{
        code::{CodeMask, Step, modifier_before, walk_back},
        matcher::LiteralMatcher,
        store::LanguageFile,
    },
    utils::{build_line_index, offset_to_line},
};

/// Reverse lookup from reference text to keys.
#[derive(Debug, Default)]
pub struct ValueIndex {
    exact: HashMap<String, Vec<String>>,
    folded: HashMap<String, Vec<(String, String)>>,
}

/// How a literal resolved against the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    Key(&'a str),
    /// Several differently-cased values match case-insensitively.
    Ambiguous(Vec<&'a str>),
    Missing,
}

impl ValueIndex {
    pub fn new<'e>(entries: impl IntoIterator<Item = (&'e str, &'e str)>) -> Self {
        let mut index = Self::default();
        for (key, value) in entries {
            let value = value.trim();
            index
                .exact
                .entry(value.to_string())
                .or_default()
                .push(key.to_string());
            index
                .folded
                .entry(value.to_lowercase())
                .or_default()
                .push((key.to_string(), value.to_string()));
        }
        index
    }

    pub fn from_language(file: &LanguageFile) -> Self {
        Self::new(file.iter())
    }

    /// Find the key for `text`.
    ///
    /// An exact match wins. Otherwise a case-insensitive match is used only when
    /// every candidate key stores the same text. Among several keys for the same
    /// text, the first one starting with `prefer_prefix` wins, else the first
    /// in insertion order.
    pub fn resolve(&self, text: &str, prefer_prefix: &str) -> Resolution<'_> {
        let text = text.trim();
        if let Some(keys) = self.exact.get(text) {
            return Resolution::Key(pick(keys.iter().map(String::as_str), prefer_prefix));
        }

        let Some(candidates) = self.folded.get(&text.to_lowercase()) else {
            return Resolution::Missing;
        };
        let first_value = &candidates[0].1;
        if candidates.iter().all(|(_, v)| v == first_value) {
            Resolution::Key(pick(candidates.iter().map(|(k, _)| k.as_str()), prefer_prefix))
        } else {
            Resolution::Ambiguous(candidates.iter().map(|(k, _)| k.as_str()).collect())
        }
    }
}

fn pick<'a>(mut keys: impl Iterator<Item = &'a str> + Clone, prefer_prefix: &str) -> &'a str {
    let first = keys.clone().next().unwrap_or_default();
    if prefer_prefix.is_empty() {
        return first;
    }
    keys.find(|k| k.starts_with(prefer_prefix)).unwrap_or(first)
}

/// A planned replacement of one literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteEdit {
    pub line: usize,
    pub text: String,
    pub key: String,
    /// Literal span including quotes.
    pub span: Range<usize>,
    pub replacement: String,
    /// Modifier keyword on the enclosing call, removed with this edit.
    pub modifier: Option<Range<usize>>,
}

/// A literal left alone because its text maps to differently-cased entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousLiteral {
    pub line: usize,
    pub col: usize,
    pub text: String,
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RewriteOutcome {
    pub content: String,
    pub edits: Vec<RewriteEdit>,
    pub import_inserted: bool,
    /// Library named by `part of`; the import has to go there instead.
    pub library_import: Option<PartOf>,
    pub ambiguous: Vec<AmbiguousLiteral>,
    /// Literals with no stored entry.
    pub unmatched: usize,
}

impl RewriteOutcome {
    pub fn changed(&self) -> bool {
        !self.edits.is_empty() || self.import_inserted
    }
}

pub struct Rewriter<'a> {
    matcher: &'a dyn LiteralMatcher,
    lookup: &'a LookupConfig,
    index: &'a ValueIndex,
}

impl<'a> Rewriter<'a> {
    pub fn new(matcher: &'a dyn LiteralMatcher, lookup: &'a LookupConfig, index: &'a ValueIndex) -> Self {
        Self {
            matcher,
            lookup,
            index,
        }
    }

    /// Plan the edits for `content` without applying them.
    pub fn plan(&self, content: &str, key_prefix: &str) -> RewriteOutcome {
        let mask = CodeMask::new(content);
        let line_index = build_line_index(content);

        let mut matches = self.matcher.find(content);
        matches.sort_by_key(|m| m.start);

        let mut outcome = RewriteOutcome::default();
        let mut last_end = 0;
        for m in matches {
            let span = m.quoted_span();
            if span.start < last_end {
                continue;
            }
            last_end = span.end;

            // Interpolated literals cannot become a plain key.
            if m.text.contains('$') {
                continue;
            }

            let line = offset_to_line(&line_index, m.start);
            match self.index.resolve(&m.text, key_prefix) {
                Resolution::Key(key) => {
                    let modifier = enclosing_call_modifier(content, &mask, span.start, &self.lookup.modifier);
                    outcome.edits.push(RewriteEdit {
                        line,
                        text: m.text.trim().to_string(),
                        key: key.to_string(),
                        replacement: format!("{q}{key}{q}{}", self.lookup.suffix, q = m.quote),
                        span,
                        modifier,
                    });
                }
                Resolution::Ambiguous(keys) => outcome.ambiguous.push(AmbiguousLiteral {
                    line,
                    col: content[line_index[line - 1]..span.start].chars().count() + 1,
                    text: m.text.trim().to_string(),
                    keys: keys.into_iter().map(String::from).collect(),
                }),
                Resolution::Missing => outcome.unmatched += 1,
            }
        }

        outcome
    }

    /// Plan and apply. `content` in the outcome is the new file text.
    pub fn rewrite(&self, content: &str, key_prefix: &str) -> RewriteOutcome {
        let mut outcome = self.plan(content, key_prefix);
        if outcome.edits.is_empty() {
            outcome.content = content.to_string();
            return outcome;
        }

        let mut replacements: Vec<(Range<usize>, &str)> = Vec::new();
        for edit in &outcome.edits {
            replacements.push((edit.span.clone(), edit.replacement.as_str()));
            if let Some(modifier) = &edit.modifier
                && !replacements.iter().any(|(r, _)| r == modifier)
            {
                replacements.push((modifier.clone(), ""));
            }
        }
        let mut rewritten = apply_replacements(content, replacements);

        if let Some(with_import) = insert_import(&rewritten, &self.lookup.import) {
            rewritten = with_import;
            outcome.import_inserted = true;
        } else if !has_import(&rewritten, &self.lookup.import) {
            outcome.library_import = part_of(&rewritten);
        }
        outcome.content = rewritten;
        outcome
    }
}

/// Modifier on the call that directly encloses the literal at `literal_start`.
fn enclosing_call_modifier(
    content: &str,
    mask: &CodeMask,
    literal_start: usize,
    modifier: &str,
) -> Option<Range<usize>> {
    match walk_back(content, mask, literal_start).next()? {
        Step::Opener(open) if content.as_bytes()[open] == b'(' => {
            modifier_before(content, mask, open, modifier)
        }
        _ => None,
    }
}

/// Apply non-overlapping replacements, last first.
pub fn apply_replacements(content: &str, mut replacements: Vec<(Range<usize>, &str)>) -> String {
    replacements.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));
    let mut out = content.to_string();
    let mut floor = content.len();
    for (range, replacement) in replacements {
        if range.end > floor {
            continue;
        }
        out.replace_range(range.clone(), replacement);
        floor = range.start;
    }
    out
}

/// What goes between the quotes of an import line, e.g. `package:x/x.dart`.
fn import_target(import: &str) -> &str {
    let mut parts = import.split(['\'', '"']);
    match (parts.next(), parts.next()) {
        (Some(_), Some(target)) if !target.is_empty() => target,
        _ => import.trim(),
    }
}

/// True when `content` already mentions the target of `import`.
pub fn has_import(content: &str, import: &str) -> bool {
    content.contains(import_target(import))
}

/// A `part of` directive: the owning library and the directive's line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartOf {
    /// Library URI or dotted library name.
    pub library: String,
    pub line: usize,
}

/// The `part of` directive of a part file, if any.
pub fn part_of(content: &str) -> Option<PartOf> {
    content.lines().enumerate().find_map(|(i, line)| {
        let rest = line.trim_start().strip_prefix("part of")?;
        if !rest.starts_with(char::is_whitespace) && !rest.starts_with(['\'', '"']) {
            return None;
        }
        let library = rest.trim().trim_end_matches(';').trim();
        Some(PartOf {
            library: library.trim_matches(['\'', '"']).to_string(),
            line: i + 1,
        })
    })
}

fn is_directive(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("import ") || line.starts_with("export ")
}

/// Insert `import` after the last import/export directive (or the library
/// declaration, or at the top). `None` when the file already imports it or is
/// a part file, which cannot hold imports.
pub fn insert_import(content: &str, import: &str) -> Option<String> {
    if import.trim().is_empty() || has_import(content, import) || part_of(content).is_some() {
        return None;
    }

    let mut offset = 0;
    let mut directive_end: Option<usize> = None;
    let mut library_end: Option<usize> = None;
    let mut in_directive = false;

    for line in content.split_inclusive('\n') {
        let next = offset + line.len();
        let trimmed = line.trim();
        if in_directive || is_directive(line) {
            in_directive = !trimmed.ends_with(';');
            if !in_directive {
                directive_end = Some(next);
            }
        } else if trimmed.starts_with("library ") && trimmed.ends_with(';') {
            library_end = Some(next);
        }
        offset = next;
    }

    let at = directive_end.or(library_end).unwrap_or(0);
    let mut out = String::with_capacity(content.len() + import.len() + 2);
    out.push_str(&content[..at]);
    if at > 0 && !content[..at].ends_with('\n') {
        out.push('\n');
    }
    out.push_str(import.trim());
    out.push('\n');
    if at == 0 && !content.is_empty() {
        out.push('\n');
    }
    out.push_str(&content[at..]);
    Some(out)
}
