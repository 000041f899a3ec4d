//! Common utility functions shared across the codebase.

/// Checks if the text contains at least one Unicode alphabetic character.
///
/// Returns false for empty strings, pure numbers, or pure symbols.
///
/// # Examples
///
/// ```
/// use relingo::utils::contains_alphabetic;
///
/// assert!(contains_alphabetic("Hello"));
/// assert!(contains_alphabetic("你好"));
/// assert!(contains_alphabetic("Hello123"));
/// assert!(!contains_alphabetic("123"));
/// assert!(!contains_alphabetic("---"));
/// assert!(!contains_alphabetic(""));
/// ```
pub fn contains_alphabetic(text: &str) -> bool {
    text.chars().any(|c| c.is_alphabetic())
}

/// Build an index of line start byte offsets.
///
/// Line 1 starts at offset 0, line 2 starts after the first '\n', etc.
pub fn build_line_index(content: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (i, b) in content.bytes().enumerate() {
        if b == b'\n' {
            offsets.push(i + 1);
        }
    }
    offsets
}

/// Find the 1-based line number for a byte offset using binary search.
pub fn offset_to_line(line_index: &[usize], offset: usize) -> usize {
    match line_index.binary_search(&offset) {
        Ok(line) => line + 1,
        Err(line) => line,
    }
}

/// Returns the full text of the line containing `offset`, without the newline.
pub fn line_at(content: &str, offset: usize) -> &str {
    let offset = offset.min(content.len());
    let start = content[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = content[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(content.len());
    content[start..end].trim_end_matches('\r')
}

/// Surrounding text of a span, `radius` bytes each side, with newlines folded to spaces.
pub fn context_snippet(content: &str, start: usize, end: usize, radius: usize) -> String {
    let from = floor_char_boundary(content, start.saturating_sub(radius));
    let to = ceil_char_boundary(content, (end + radius).min(content.len()));
    content[from..to].replace(['\n', '\r'], " ").trim().to_string()
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(s: &str, mut i: usize) -> usize {
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
