//! Key Synthesizer: stable identifiers for extracted literals.
//!
//! A key reads `<scope>_<screen>_<role>_<first words>`, e.g.
//! `ads_create_ad_button_save_changes`. Collisions between different texts are
//! resolved by a numeric disambiguator; identical texts share one key.

use std::collections::HashMap;

use crate::core::matcher::TextRole;

/// Number of leading words of the text used in the key.
const SUFFIX_WORDS: usize = 3;

/// Role vocabulary, checked in order. Multi-word entries match the phrase.
const ROLE_VOCABULARY: &[(&str, &[&str])] = &[
    ("error", &["error", "failed", "invalid"]),
    ("success", &["success", "saved", "updated"]),
    ("loading", &["loading", "please wait"]),
    ("title", &["title", "welcome", "hello"]),
    ("label", &["label", "name", "email", "password"]),
    ("button", &["button", "click", "press", "tap"]),
    ("hint", &["hint", "search", "enter", "type"]),
    ("message", &["message", "description", "info"]),
];

/// Lowercase `value`, turning every run of non-alphanumerics into one `_`.
pub fn normalize_token(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

/// Scope token: the package name without its shared prefix.
pub fn scope_token(scope: &str, prefix: &str) -> String {
    let scope = if prefix.is_empty() {
        scope
    } else {
        scope.strip_prefix(prefix).unwrap_or(scope)
    };
    normalize_token(scope)
}

/// Screen token: the file name without the first matching suffix.
pub fn screen_token(file_name: &str, suffixes: &[String]) -> String {
    let stem = suffixes
        .iter()
        .find_map(|s| file_name.strip_suffix(s.as_str()))
        .unwrap_or(file_name);
    normalize_token(stem)
}

/// Role segment derived from what the text says, falling back to where it was found.
pub fn role_token(text: &str, found_as: TextRole) -> String {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let phrase = words.join(" ");

    for (role, vocabulary) in ROLE_VOCABULARY {
        let hit = vocabulary.iter().any(|entry| {
            if entry.contains(' ') {
                phrase.contains(entry)
            } else {
                words.contains(entry)
            }
        });
        if hit {
            return role.to_string();
        }
    }

    match found_as {
        TextRole::Text | TextRole::Generic => "text".to_string(),
        other => normalize_token(&other.to_string()),
    }
}

/// First significant words of the text, ASCII only.
pub fn text_suffix(text: &str) -> Option<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().take(SUFFIX_WORDS).collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join("_"))
    }
}

/// Join key segments with `_`, collapsing repeats and trailing separators.
pub fn join_key(segments: &[&str]) -> String {
    let mut key = String::new();
    for segment in segments {
        for c in segment.chars() {
            if c == '_' && (key.is_empty() || key.ends_with('_')) {
                continue;
            }
            key.push(c);
        }
        if !key.is_empty() && !key.ends_with('_') {
            key.push('_');
        }
    }
    key.trim_end_matches('_').to_string()
}

/// Where a literal sits, as far as keys are concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyScope {
    pub scope: String,
    pub screen: String,
}

impl KeyScope {
    pub fn new(scope: &str, file_name: &str, prefix: &str, suffixes: &[String]) -> Self {
        Self {
            scope: scope_token(scope, prefix),
            screen: screen_token(file_name, suffixes),
        }
    }

    /// Common start of every key generated for this file.
    pub fn prefix(&self) -> String {
        join_key(&[&self.scope, &self.screen])
    }
}

/// Build a key. `index` stands in for the text suffix when the text has no
/// usable words, and `disambiguator` is appended when greater than one.
pub fn make_key(
    scope: &KeyScope,
    role: &str,
    text: &str,
    index: usize,
    disambiguator: usize,
) -> String {
    let suffix = text_suffix(text).unwrap_or_else(|| format!("item_{}", index));
    let base = join_key(&[&scope.scope, &scope.screen, role, &suffix]);
    if disambiguator > 1 {
        format!("{}_{}", base, disambiguator)
    } else {
        base
    }
}

/// Outcome of reserving a key for a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAssignment {
    pub key: String,
    /// False when an existing entry with the same text was reused.
    pub is_new: bool,
}

/// Run-scoped key reservations.
///
/// Holds the keys handed out during the current run so collisions are
/// resolved the same way whichever file asks first. Create one per run.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    pending: HashMap<String, String>,
    order: Vec<String>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a key for `text`, consulting `existing` for persisted entries.
    ///
    /// Probes `base`, `base_2`, `base_3`, ... and returns the first slot that is
    /// free or already holds the same text.
    pub fn assign<'a, F>(
        &mut self,
        scope: &KeyScope,
        role: &str,
        text: &str,
        index: usize,
        existing: F,
    ) -> KeyAssignment
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let mut disambiguator = 1;
        loop {
            let key = make_key(scope, role, text, index, disambiguator);
            let taken = self
                .pending
                .get(&key)
                .map(String::as_str)
                .or_else(|| existing(&key));
            match taken {
                Some(value) if value == text => {
                    return KeyAssignment { key, is_new: false };
                }
                Some(_) => disambiguator += 1,
                None => {
                    self.pending.insert(key.clone(), text.to_string());
                    self.order.push(key.clone());
                    return KeyAssignment { key, is_new: true };
                }
            }
        }
    }

    /// Keys reserved in this run, in reservation order.
    pub fn reserved(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|k| self.pending.get(k).map(|v| (k.as_str(), v.as_str())))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
