//! Violation Repair Pass: removes `const` from expressions that now contain a
//! lookup call.
//!
//! Best effort over text. Single-line conflicts are fixed first, then every call
//! walks outward through its enclosing brackets. A `const` declaration is
//! turned into a runtime one instead of losing its keyword. What cannot be
//! fixed is reported and left as is.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

use crate::{
    config::LookupConfig,
    core::{
        code::{CodeMask, Step, code_occurrences, is_ident_byte, matching_close, modifier_before, walk_back},
        rewrite::apply_replacements,
    },
    utils::{build_line_index, line_at, offset_to_line},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepairStrategy {
    /// Modifier and call on one line, inside one balanced expression.
    SingleLine,
    /// Modifier found on an enclosing construct across lines.
    Enclosing,
    /// `const` declaration turned into a runtime declaration.
    Declaration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairFix {
    pub line: usize,
    pub strategy: RepairStrategy,
}

/// A lookup call still inside a constant expression after repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedViolation {
    pub line: usize,
    pub col: usize,
    pub source_line: String,
}

#[derive(Debug, Clone, Default)]
pub struct RepairOutcome {
    pub content: String,
    pub fixes: Vec<RepairFix>,
    pub unresolved: Vec<UnresolvedViolation>,
}

impl RepairOutcome {
    pub fn changed(&self) -> bool {
        !self.fixes.is_empty()
    }
}

struct PlannedFix {
    range: std::ops::Range<usize>,
    strategy: RepairStrategy,
}

pub struct RepairPass {
    modifier: String,
    runtime_modifier: String,
    /// Lookup call without its argument list, e.g. `.tr(`.
    call: String,
    declaration: Regex,
}

impl RepairPass {
    pub fn new(lookup: &LookupConfig) -> Result<Self> {
        let call = lookup
            .suffix
            .strip_suffix(')')
            .unwrap_or(&lookup.suffix)
            .to_string();
        let pattern = format!(
            r"^\s*(?:(?:static|late|external)\s+)*({})\s+[\w<>?,.\s]*?\w\s*=(?:[^=>]|$)",
            regex::escape(&lookup.modifier)
        );
        let declaration = Regex::new(&pattern)
            .with_context(|| format!("Invalid modifier: {}", lookup.modifier))?;

        Ok(Self {
            modifier: lookup.modifier.clone(),
            runtime_modifier: lookup.runtime_modifier.clone(),
            call,
            declaration,
        })
    }

    pub fn repair(&self, content: &str) -> RepairOutcome {
        let mask = CodeMask::new(content);
        let calls = code_occurrences(content, &mask, &self.call);
        if calls.is_empty() {
            return RepairOutcome {
                content: content.to_string(),
                ..Default::default()
            };
        }

        let mut planned: BTreeMap<usize, PlannedFix> = BTreeMap::new();
        self.plan_single_line(content, &mask, &calls, &mut planned);
        for &call in &calls {
            self.plan_enclosing(content, &mask, call, &mut planned);
        }

        let line_index = build_line_index(content);
        let fixes = planned
            .iter()
            .map(|(&start, fix)| RepairFix {
                line: offset_to_line(&line_index, start),
                strategy: fix.strategy,
            })
            .collect();
        let replacements = planned
            .values()
            .map(|fix| {
                let replacement = match fix.strategy {
                    RepairStrategy::Declaration => self.runtime_modifier.as_str(),
                    _ => "",
                };
                (fix.range.clone(), replacement)
            })
            .collect();
        let content = apply_replacements(content, replacements);
        let unresolved = self.find_unresolved(&content);

        RepairOutcome {
            content,
            fixes,
            unresolved,
        }
    }

    /// Modifiers whose balanced expression closes on the same line and holds a call.
    fn plan_single_line(
        &self,
        content: &str,
        mask: &CodeMask,
        calls: &[usize],
        planned: &mut BTreeMap<usize, PlannedFix>,
    ) {
        let bytes = content.as_bytes();
        for pos in self.modifier_tokens(content, mask) {
            let line_end = content[pos..].find('\n').map_or(content.len(), |i| pos + i);
            let Some(opener) = (pos + self.modifier.len()..line_end)
                .find(|&i| mask.is_code(i) && matches!(bytes[i], b'(' | b'[' | b'{'))
            else {
                continue;
            };
            let Some(range) = modifier_before(content, mask, opener, &self.modifier) else {
                continue;
            };
            if range.start != pos {
                continue;
            }
            let Some(close) = matching_close(content, mask, opener, line_end) else {
                continue;
            };
            if calls.iter().any(|&c| c > opener && c < close) {
                planned.insert(
                    pos,
                    PlannedFix {
                        range,
                        strategy: RepairStrategy::SingleLine,
                    },
                );
            }
        }
    }

    /// Walk outward from a call to its statement, stripping every modifier on
    /// the way. Modifiers already planned are not edited twice.
    fn plan_enclosing(
        &self,
        content: &str,
        mask: &CodeMask,
        call: usize,
        planned: &mut BTreeMap<usize, PlannedFix>,
    ) {
        for step in walk_back(content, mask, call) {
            match step {
                Step::Opener(open) => {
                    if let Some(range) = modifier_before(content, mask, open, &self.modifier) {
                        planned.entry(range.start).or_insert(PlannedFix {
                            range,
                            strategy: RepairStrategy::Enclosing,
                        });
                    } else if content.as_bytes()[open] == b'{' {
                        break;
                    }
                }
                Step::Semicolon(_) => break,
                Step::ClosedBlock(_) => {}
            }
        }

        if let Some(range) = self.declaration_modifier(content, mask, call) {
            planned.entry(range.start).or_insert(PlannedFix {
                range,
                strategy: RepairStrategy::Declaration,
            });
        }
    }

    /// Modifier of the declaration whose initializer holds the call.
    fn declaration_modifier(
        &self,
        content: &str,
        mask: &CodeMask,
        call: usize,
    ) -> Option<std::ops::Range<usize>> {
        let start = statement_start(content, mask, call, &self.modifier);
        let start = skip_trivia(content, mask, start, call);
        let word = self.declaration.captures(&content[start..call])?.get(1)?;
        let range = (start + word.start())..(start + word.end());
        mask.is_code(range.start).then_some(range)
    }

    /// Standalone occurrences of the modifier keyword in code.
    fn modifier_tokens(&self, content: &str, mask: &CodeMask) -> Vec<usize> {
        let bytes = content.as_bytes();
        code_occurrences(content, mask, &self.modifier)
            .into_iter()
            .filter(|&pos| {
                let end = pos + self.modifier.len();
                (pos == 0 || !is_ident_byte(bytes[pos - 1]))
                    && (end >= bytes.len() || !is_ident_byte(bytes[end]))
            })
            .collect()
    }

    /// Calls that still have a modifier on any enclosing construct.
    fn find_unresolved(&self, content: &str) -> Vec<UnresolvedViolation> {
        let mask = CodeMask::new(content);
        let line_index = build_line_index(content);
        let mut seen_lines = BTreeSet::new();
        let mut unresolved = Vec::new();

        for call in code_occurrences(content, &mask, &self.call) {
            let violated = walk_back(content, &mask, call).any(|step| {
                matches!(step, Step::Opener(open)
                    if modifier_before(content, &mask, open, &self.modifier).is_some())
            }) || self.declaration_modifier(content, &mask, call).is_some();
            let line = offset_to_line(&line_index, call);
            if violated && seen_lines.insert(line) {
                let line_start = line_index[line - 1];
                unresolved.push(UnresolvedViolation {
                    line,
                    col: content[line_start..call].chars().count() + 1,
                    source_line: line_at(content, call).to_string(),
                });
            }
        }

        unresolved
    }
}

/// Start of the statement holding `call`: after the nearest `;` or plain block
/// opener, or after a block closed at the same level.
fn statement_start(content: &str, mask: &CodeMask, call: usize, modifier: &str) -> usize {
    let mut after_block: Option<usize> = None;
    for step in walk_back(content, mask, call) {
        match step {
            Step::Opener(open) => {
                after_block = None;
                if content.as_bytes()[open] == b'{'
                    && modifier_before(content, mask, open, modifier).is_none()
                {
                    return open + 1;
                }
            }
            Step::Semicolon(at) => return after_block.map_or(at + 1, |b| b.max(at + 1)),
            Step::ClosedBlock(at) => {
                after_block.get_or_insert(at + 1);
            }
        }
    }
    after_block.unwrap_or(0)
}

/// First code byte at or after `from` that is not whitespace, a comment or an
/// `@annotation`.
fn skip_trivia(content: &str, mask: &CodeMask, mut from: usize, limit: usize) -> usize {
    let bytes = content.as_bytes();
    while from < limit {
        if !mask.is_code(from) || bytes[from].is_ascii_whitespace() {
            from += 1;
        } else if bytes[from] == b'@' {
            from += 1;
            while from < limit && (is_ident_byte(bytes[from]) || bytes[from] == b'.') {
                from += 1;
            }
            if from < limit
                && bytes[from] == b'('
                && let Some(close) = matching_close(content, mask, from, limit)
            {
                from = close + 1;
            }
        } else {
            break;
        }
    }
    from
}
