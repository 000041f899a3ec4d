use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

/// `${name}`, `{name}` and `$name`, tried in that order at each position.
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{[^}]+\}|\{[^}]+\}|\$[a-zA-Z_]\w*").unwrap());

/// Distinct interpolation markers of a text value.
///
/// Parity is checked over the set: count and order do not matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlaceholderSet(BTreeSet<String>);

impl PlaceholderSet {
    pub fn extract(text: &str) -> Self {
        Self(
            PLACEHOLDER_REGEX
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl std::fmt::Display for PlaceholderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(none)");
        }
        let tokens: Vec<&str> = self.tokens().collect();
        write!(f, "{}", tokens.join(", "))
    }
}

/// Remove every placeholder token from `text`.
pub fn strip_placeholders(text: &str) -> String {
    PLACEHOLDER_REGEX.replace_all(text, "").into_owned()
}

/// A translated value whose placeholders differ from the reference value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderMismatch {
    pub language: String,
    pub key: String,
    pub reference: PlaceholderSet,
    pub translation: PlaceholderSet,
    pub translated_value: String,
}

/// Compare a reference value against a translation.
///
/// Returns `None` when the placeholder sets are equal.
pub fn check_placeholders(
    language: &str,
    key: &str,
    reference_value: &str,
    translated_value: &str,
) -> Option<PlaceholderMismatch> {
    let reference = PlaceholderSet::extract(reference_value);
    let translation = PlaceholderSet::extract(translated_value);
    if reference == translation {
        return None;
    }
    Some(PlaceholderMismatch {
        language: language.to_string(),
        key: key.to_string(),
        reference,
        translation,
        translated_value: translated_value.to_string(),
    })
}
