//! Built-in literal patterns for widget-style UI sources.
//!
//! Every pattern captures the literal body in its first participating group,
//! one group per quote style. Bodies never span a newline, but the surrounding
//! call syntax may.

use std::{fmt, sync::LazyLock};

use anyhow::{Context, Result};
use regex::{Captures, Match, Regex};
use serde::Serialize;

/// Semantic role of the construct a literal was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextRole {
    Text,
    Title,
    Button,
    Label,
    Hint,
    Tooltip,
    Dialog,
    Message,
    Error,
    ListItem,
    Generic,
}

impl TextRole {
    /// Higher means the pattern that found the literal says more about it.
    pub fn specificity(self) -> u8 {
        match self {
            TextRole::Generic => 0,
            TextRole::Text => 1,
            TextRole::Error | TextRole::Title => 2,
            _ => 3,
        }
    }
}

impl fmt::Display for TextRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextRole::Text => "text",
            TextRole::Title => "title",
            TextRole::Button => "button",
            TextRole::Label => "label",
            TextRole::Hint => "hint",
            TextRole::Tooltip => "tooltip",
            TextRole::Dialog => "dialog",
            TextRole::Message => "message",
            TextRole::Error => "error",
            TextRole::ListItem => "list-item",
            TextRole::Generic => "generic",
        };
        write!(f, "{}", name)
    }
}

/// One text pattern bound to a role.
#[derive(Debug, Clone)]
pub struct LiteralPattern {
    pub role: TextRole,
    pub regex: Regex,
    /// Reject a match when the text right before it ends with this regex.
    pub not_preceded_by: Option<Regex>,
}

impl LiteralPattern {
    pub fn new(role: TextRole, pattern: &str) -> Result<Self> {
        let regex =
            Regex::new(pattern).with_context(|| format!("Invalid literal pattern: {}", pattern))?;
        Ok(Self {
            role,
            regex,
            not_preceded_by: None,
        })
    }

    pub fn not_preceded_by(mut self, pattern: &str) -> Result<Self> {
        let anchored = format!("(?:{})$", pattern);
        self.not_preceded_by = Some(
            Regex::new(&anchored)
                .with_context(|| format!("Invalid exclusion pattern: {}", pattern))?,
        );
        Ok(self)
    }
}

const LIT: &str = r#"(?:'((?:[^'\\\n]|\\.)+)'|"((?:[^"\\\n]|\\.)+)")"#;
const TEXT_CALL: &str = r#"(?:const\s+)?Text\s*\(\s*"#;

static DEFAULT_PATTERNS: LazyLock<Vec<LiteralPattern>> = LazyLock::new(|| {
    let specs: Vec<(TextRole, String)> = vec![
        (TextRole::Text, format!(r"Text\s*\(\s*{LIT}")),
        (TextRole::Title, format!(r"title:\s*{TEXT_CALL}{LIT}")),
        (TextRole::Button, format!(r"(?:child|label):\s*{TEXT_CALL}{LIT}")),
        (TextRole::Hint, format!(r"(?:hintText|helperText):\s*{LIT}")),
        (TextRole::Label, format!(r"labelText:\s*{LIT}")),
        (TextRole::Dialog, format!(r"content:\s*{TEXT_CALL}{LIT}")),
        (TextRole::Tooltip, format!(r"tooltip:\s*{LIT}")),
        (
            TextRole::Message,
            format!(r"SnackBar\s*\([^)]*?content:\s*{TEXT_CALL}{LIT}"),
        ),
        (
            TextRole::Generic,
            r#"'([A-Z](?:[^'\\\n]|\\.){10,})'|"([A-Z](?:[^"\\\n]|\\.){10,})""#.to_string(),
        ),
        (TextRole::Error, format!(r#"(?:error|Error)[^'"\n]*?{LIT}"#)),
        (TextRole::Title, format!(r#"(?:title|Title)[^'"\n]*?{LIT}"#)),
        (TextRole::Label, format!(r"Tab\s*\([^)]*?text:\s*{LIT}")),
        (
            TextRole::ListItem,
            format!(r"ListTile\s*\([^)]*?title:\s*{TEXT_CALL}{LIT}"),
        ),
        (
            TextRole::Button,
            format!(r"TextButton\s*\([^)]*?child:\s*{TEXT_CALL}{LIT}"),
        ),
    ];

    specs
        .into_iter()
        .map(|(role, pattern)| {
            let literal = LiteralPattern::new(role, &pattern).unwrap();
            if role == TextRole::Generic {
                literal.not_preceded_by(r"import\s").unwrap()
            } else {
                literal
            }
        })
        .collect()
});

/// The literal body: the first group that took part in the match.
pub fn body_group<'h>(caps: &Captures<'h>) -> Option<Match<'h>> {
    caps.iter().skip(1).flatten().next()
}

/// The built-in pattern list, in scan priority order.
pub fn default_patterns() -> Vec<LiteralPattern> {
    DEFAULT_PATTERNS.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captures(role: TextRole, input: &str) -> Vec<String> {
        default_patterns()
            .iter()
            .filter(|p| p.role == role)
            .flat_map(|p| {
                p.regex
                    .captures_iter(input)
                    .filter_map(|c| body_group(&c).map(|m| m.as_str().to_string()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_default_patterns_compile() {
        assert_eq!(default_patterns().len(), 14);
    }

    #[test]
    fn test_text_pattern_spans_lines() {
        let input = "Text(\n  'Save Changes',\n)";
        assert_eq!(captures(TextRole::Text, input), vec!["Save Changes"]);
    }

    #[test]
    fn test_hint_and_helper() {
        let input = "hintText: 'Search artists', helperText: \"At least 8 chars\"";
        assert_eq!(
            captures(TextRole::Hint, input),
            vec!["Search artists", "At least 8 chars"]
        );
    }

    #[test]
    fn test_literal_body_never_crosses_newline() {
        let input = "tooltip: 'Open\nmenu'";
        assert!(captures(TextRole::Tooltip, input).is_empty());
    }

    #[test]
    fn test_apostrophes_in_either_quote_style() {
        let input = r#"Text("Don't have an account?") Text('Can\'t connect') Text("Say \"hi\"")"#;
        assert_eq!(
            captures(TextRole::Text, input),
            vec!["Don't have an account?", r"Can\'t connect", r#"Say \"hi\""#]
        );
    }

    #[test]
    fn test_snackbar_message() {
        let input = "SnackBar(\n  content: const Text('Profile updated'),\n)";
        assert_eq!(captures(TextRole::Message, input), vec!["Profile updated"]);
    }

    #[test]
    fn test_role_specificity_order() {
        assert!(TextRole::Button.specificity() > TextRole::Text.specificity());
        assert!(TextRole::Text.specificity() > TextRole::Generic.specificity());
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(LiteralPattern::new(TextRole::Text, "Text(").is_err());
    }
}
