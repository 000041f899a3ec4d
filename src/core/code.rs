//! Lexical helpers over C-family source text.
//!
//! Not a parser: just enough to tell code bytes from string and comment bytes,
//! and to walk bracket nesting around a position.

use std::ops::Range;

/// Per-byte flag: `true` when the byte is code, `false` inside strings and comments.
pub struct CodeMask {
    code: Vec<bool>,
}

impl CodeMask {
    pub fn new(content: &str) -> Self {
        let bytes = content.as_bytes();
        let mut code = vec![true; bytes.len()];
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    let end = find_byte(bytes, i, b'\n');
                    code[i..end].fill(false);
                    i = end;
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    let end = find_seq(bytes, i + 2, b"*/").map_or(bytes.len(), |e| e + 2);
                    code[i..end].fill(false);
                    i = end;
                }
                q @ (b'\'' | b'"') => {
                    let raw = i > 0 && bytes[i - 1] == b'r' && (i < 2 || !is_ident_byte(bytes[i - 2]));
                    let end = string_end(bytes, i, q, raw);
                    code[i..end].fill(false);
                    i = end;
                }
                _ => i += 1,
            }
        }

        Self { code }
    }

    pub fn is_code(&self, offset: usize) -> bool {
        self.code.get(offset).copied().unwrap_or(false)
    }

    /// True when `span` covers exactly one whole string literal.
    pub fn is_literal(&self, span: &Range<usize>) -> bool {
        if span.is_empty() || span.end > self.code.len() {
            return false;
        }
        let starts = span.start == 0 || self.code[span.start - 1];
        let ends = span.end == self.code.len() || self.code[span.end];
        starts && ends && self.code[span.clone()].iter().all(|&c| !c)
    }
}

/// End (exclusive) of the string literal opening at `start`.
fn string_end(bytes: &[u8], start: usize, quote: u8, raw: bool) -> usize {
    let triple = bytes.get(start + 1) == Some(&quote) && bytes.get(start + 2) == Some(&quote);
    let mut i = start + if triple { 3 } else { 1 };

    while i < bytes.len() {
        let b = bytes[i];
        if !raw && b == b'\\' {
            i += 2;
            continue;
        }
        if !raw && b == b'$' && bytes.get(i + 1) == Some(&b'{') {
            i = interpolation_end(bytes, i + 2);
            continue;
        }
        if triple {
            if b == quote && bytes.get(i + 1) == Some(&quote) && bytes.get(i + 2) == Some(&quote) {
                return i + 3;
            }
        } else if b == quote {
            return i + 1;
        } else if b == b'\n' {
            return i;
        }
        i += 1;
    }
    bytes.len()
}

fn interpolation_end(bytes: &[u8], mut i: usize) -> usize {
    let mut depth = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            q @ (b'\'' | b'"') => {
                i = string_end(bytes, i, q, false);
                continue;
            }
            b'\n' => return i,
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == needle)
        .map_or(bytes.len(), |p| from + p)
}

fn find_seq(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn skip_ws_back(bytes: &[u8], mut j: usize) -> usize {
    while j > 0 && bytes[j - 1].is_ascii_whitespace() {
        j -= 1;
    }
    j
}

/// `j` sits right after a `>`; return the position of its matching `<`.
fn skip_generics_back(bytes: &[u8], mut j: usize) -> usize {
    let mut depth = 0;
    while j > 0 {
        j -= 1;
        match bytes[j] {
            b'>' => depth += 1,
            b'<' => {
                depth -= 1;
                if depth == 0 {
                    return j;
                }
            }
            b'(' | b')' | b';' | b'{' | b'}' => return j + 1,
            _ => {}
        }
    }
    j
}

/// Byte range of `modifier` (plus trailing whitespace) in front of the construct
/// that opens at `opener`.
///
/// Accepts `const Name(`, `const Name.named(`, `const Name<T>(`, `const <T>[`,
/// `const [` and `const {`.
pub fn modifier_before(
    content: &str,
    mask: &CodeMask,
    opener: usize,
    modifier: &str,
) -> Option<Range<usize>> {
    let bytes = content.as_bytes();
    let mut j = skip_ws_back(bytes, opener);
    if j > 0 && bytes[j - 1] == b'>' {
        j = skip_ws_back(bytes, skip_generics_back(bytes, j));
    }
    let name_end = j;
    while j > 0 && (is_ident_byte(bytes[j - 1]) || bytes[j - 1] == b'.') {
        j -= 1;
    }

    // `const [` and `const <T>[` have no constructor name.
    let (start, mut end) = if content.get(j..name_end)? == modifier {
        (j, name_end)
    } else {
        let modifier_end = skip_ws_back(bytes, j);
        (modifier_end.checked_sub(modifier.len())?, modifier_end)
    };
    if content.get(start..end)? != modifier
        || !mask.is_code(start)
        || (start > 0 && is_ident_byte(bytes[start - 1]))
    {
        return None;
    }
    while end < opener && bytes[end].is_ascii_whitespace() {
        end += 1;
    }
    Some(start..end)
}

/// Position of the closing bracket matching the opener at `open`, searched
/// forward up to `limit`.
pub fn matching_close(content: &str, mask: &CodeMask, open: usize, limit: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().take(limit.min(bytes.len())).skip(open) {
        if !mask.is_code(i) {
            continue;
        }
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// A code byte met while walking backward from a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// An opening bracket not closed before the start position.
    Opener(usize),
    /// A `;` at the current nesting level.
    Semicolon(usize),
    /// A `}` at the current nesting level.
    ClosedBlock(usize),
}

/// Walk backward from `from`, yielding unmatched openers and same-level
/// statement punctuation, nearest first.
pub fn walk_back<'a>(content: &'a str, mask: &'a CodeMask, from: usize) -> impl Iterator<Item = Step> + 'a {
    let bytes = content.as_bytes();
    let mut depth = 0usize;
    (0..from.min(bytes.len())).rev().filter_map(move |i| {
        if !mask.is_code(i) {
            return None;
        }
        match bytes[i] {
            b')' | b']' => {
                depth += 1;
                None
            }
            b'}' => {
                depth += 1;
                (depth == 1).then_some(Step::ClosedBlock(i))
            }
            b'(' | b'[' | b'{' => {
                if depth == 0 {
                    Some(Step::Opener(i))
                } else {
                    depth -= 1;
                    None
                }
            }
            b';' if depth == 0 => Some(Step::Semicolon(i)),
            _ => None,
        }
    })
}

/// Every code occurrence of `needle` in `content`.
pub fn code_occurrences(content: &str, mask: &CodeMask, needle: &str) -> Vec<usize> {
    if needle.is_empty() {
        return Vec::new();
    }
    content
        .match_indices(needle)
        .map(|(i, _)| i)
        .filter(|&i| mask.is_code(i))
        .collect()
}
